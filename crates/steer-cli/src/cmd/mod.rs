pub mod augment;
pub mod check;
pub mod init;
pub mod rules;
