//! Integration tests for platform-deploy
//!
//! These tests spawn the actual binary and test end-to-end behavior.
