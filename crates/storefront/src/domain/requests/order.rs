use serde::Serialize;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateOrderItemRequest {
    #[validate(range(min = 1))]
    pub car_id: i64,

    #[validate(range(min = 1))]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1), nested)]
    pub items: Vec<CreateOrderItemRequest>,
}

impl CreateOrderRequest {
    /// A deposit reserves exactly one unit of one car.
    pub fn deposit(car_id: i64) -> Self {
        Self {
            items: vec![CreateOrderItemRequest {
                car_id,
                quantity: 1,
            }],
        }
    }
}
