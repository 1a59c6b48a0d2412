pub mod common;
pub mod orderdtos;
pub mod refunddtos;
pub mod violationdtos;
