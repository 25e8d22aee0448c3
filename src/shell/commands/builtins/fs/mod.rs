pub mod copy;
pub mod del;
pub mod ls;
pub mod mv;
pub mod rename;
pub mod search;
