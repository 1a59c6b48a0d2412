pub mod orders;
pub mod refunds;
pub mod violations;
