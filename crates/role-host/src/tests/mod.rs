//! Test suites for the role host lifecycle and bootstrap.

mod support;
