use stripe::Client;

/// Builds a Stripe client, or `None` when no secret key is configured.
pub fn create_client(secret_key: &str) -> Option<Client> {
    if secret_key.trim().is_empty() {
        None
    } else {
        Some(Client::new(secret_key))
    }
}
