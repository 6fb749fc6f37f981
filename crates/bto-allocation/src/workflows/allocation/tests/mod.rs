mod common;
mod enquiries;
mod reporting;
