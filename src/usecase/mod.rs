mod manage_order;
mod payment;
mod progress;
mod view;

pub use manage_order::{
    CancelOrderUcOutput, CancelOrderUseCase, CreateOrderUsKsErr, CreateOrderUseCase,
};
pub use payment::{
    CreatePaymentSessionUseCase, PaySessionUcOutput, PaymentConfirmUcOutput, PaymentConfirmUseCase,
};
pub use progress::{AdvanceStatusUcOutput, AdvanceStatusUseCase, MarkDeliveredUseCase};
pub use view::{
    AdminOrderStatsUseCase, ListOwnerOrdersUseCase, ListSellerOrdersUseCase, ReadOrderUcOutput,
    ReadOrderUseCase,
};
