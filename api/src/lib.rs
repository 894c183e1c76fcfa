use actix_web::web::{self};

pub mod state;

pub mod routes {
    pub mod features;
    pub mod friends;
    pub mod pay;
    pub mod plans;
    pub mod sub;
    pub mod wallet;
}

mod dtos {
    pub(crate) mod features;
    pub(crate) mod friends;
    pub(crate) mod sub;
    pub(crate) mod wallet;
}

pub use state::AppState;

pub fn mount_plans() -> actix_web::Scope {
    web::scope("/plans").service(routes::plans::get_plans)
}
pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/pay").service(routes::pay::post_webhook)
}
pub fn mount_me() -> actix_web::Scope {
    web::scope("/me")
        .service(routes::sub::get_entitlement)
        .service(routes::sub::post_checkout)
        .service(routes::sub::post_confirm)
        .service(routes::sub::post_logout)
        .service(routes::friends::get_friends)
        .service(routes::friends::post_friend)
        .service(routes::friends::delete_friend)
        .service(routes::friends::put_presence)
        .service(routes::features::get_feature)
        .service(routes::features::put_gender)
        .service(routes::wallet::get_wallet)
        .service(routes::wallet::post_daily_bonus)
}
