pub mod ask;
pub mod calculator;
pub mod health;
