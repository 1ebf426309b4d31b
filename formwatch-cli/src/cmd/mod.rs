pub mod config;
pub mod coupon;
pub mod doctor;
pub mod inspect;
pub mod migrate;
pub mod progress;
pub mod run;
pub mod validate;
pub mod watch;
