use crate::lookup::DomainValidator;

pub struct AppState {
    pub validator: DomainValidator,
}
