pub mod customer;
pub mod merchant;
pub mod redemption;
pub mod transaction;
