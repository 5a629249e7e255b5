pub mod accounts;
pub mod cms;
