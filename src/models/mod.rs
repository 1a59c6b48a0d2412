pub mod ordermodel;
pub mod refundmodel;
pub mod usermodel;
pub mod violationmodel;
