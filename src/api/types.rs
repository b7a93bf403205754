use std::sync::Arc;

use crate::gate::PasskeyGate;
use crate::notify::Notifier;
use crate::registration::RegistrationService;
use crate::scheduling::AppointmentService;
use crate::store::RecordStore;

/// Shared state for handlers and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub registration: Arc<RegistrationService>,
    pub appointments: Arc<AppointmentService>,
    pub gate: Arc<PasskeyGate>,
}

impl ApiContext {
    pub fn new(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        admin_passkey: &str,
    ) -> Self {
        Self {
            registration: Arc::new(RegistrationService::new(store.clone())),
            appointments: Arc::new(AppointmentService::new(store, notifier)),
            gate: Arc::new(PasskeyGate::new(admin_passkey)),
        }
    }
}
