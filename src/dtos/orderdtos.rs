use serde::{Deserialize, Serialize};

use crate::models::{
    ordermodel::{Order, OrderItem},
    refundmodel::DepositRefund,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderDetailDto {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub refund: Option<DepositRefund>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderReturnedDto {
    pub order: Order,
    pub refund: DepositRefund,
}
