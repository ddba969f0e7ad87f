pub mod notify;
pub mod processor;

pub use notify::{AbsNotifySink, AppLogNotifySink, AppNotifyDispatcher, AppNotifyTask};
pub use processor::{
    app_processor_context, AbstractPaymentProcessor, AppProcessorError, AppProcessorErrorReason,
    AppProcessorSession, MockPaymentProcessor,
};
