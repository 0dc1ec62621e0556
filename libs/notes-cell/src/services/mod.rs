pub mod drafter;
