pub mod db;
pub mod orderdb;
pub mod refunddb;
pub mod userdb;
pub mod violationdb;
