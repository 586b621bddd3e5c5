use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{
    AntifraudCache, AntifraudGate, Catalog, FeedEngine, FraudDecisionService, PromoCodeStore,
    RedemptionEngine, SocialEngine,
};
use persistence::repositories::AccountRepository;
use persistence::PgPromoCodeStore;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_business, require_user, trace_id,
};
use crate::routes::{auth, business_promo, health, user};
use crate::services::{AuthService, HttpFraudDecisionClient, RedisAntifraudCache};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub store: Arc<dyn PromoCodeStore>,
    pub catalog: Arc<Catalog>,
    pub feed: Arc<FeedEngine>,
    pub social: Arc<SocialEngine>,
    pub redemption: Arc<RedemptionEngine>,
}

impl AppState {
    /// Wires the production anti-fraud pair: Redis cache and HTTP decision client.
    pub fn new(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let cache = RedisAntifraudCache::new(&config.antifraud.redis_url, &config.antifraud.key_prefix)?;
        let decisions = HttpFraudDecisionClient::new(&config.antifraud)?;
        Self::with_antifraud(config, pool, Arc::new(cache), Arc::new(decisions))
    }

    pub fn with_antifraud(
        config: Config,
        pool: PgPool,
        cache: Arc<dyn AntifraudCache>,
        decisions: Arc<dyn FraudDecisionService>,
    ) -> anyhow::Result<Self> {
        let jwt = AuthService::jwt_from_config(&config.jwt)?;
        let auth = AuthService::new(AccountRepository::new(pool.clone()), jwt);

        let store: Arc<dyn PromoCodeStore> = Arc::new(PgPromoCodeStore::new(pool.clone()));
        let gate = Arc::new(AntifraudGate::new(cache, decisions));

        Ok(Self {
            pool,
            config: Arc::new(config),
            auth: Arc::new(auth),
            catalog: Arc::new(Catalog::new(store.clone())),
            feed: Arc::new(FeedEngine::new(store.clone())),
            social: Arc::new(SocialEngine::new(store.clone())),
            redemption: Arc::new(RedemptionEngine::new(store.clone(), gate)),
            store,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let business_routes = Router::new()
        .route(
            "/api/business/promo",
            post(business_promo::create_promo).get(business_promo::list_promos),
        )
        .route(
            "/api/business/promo/:id",
            get(business_promo::get_promo).patch(business_promo::edit_promo),
        )
        .route("/api/business/promo/:id/stat", get(business_promo::promo_stat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_business,
        ));

    let user_routes = Router::new()
        .route(
            "/api/user/profile",
            get(user::get_profile).patch(user::edit_profile),
        )
        .route("/api/user/feed", get(user::feed))
        .route("/api/user/promo/history", get(user::history))
        .route("/api/user/promo/:id", get(user::get_promo))
        .route(
            "/api/user/promo/:id/like",
            post(user::like).delete(user::unlike),
        )
        .route(
            "/api/user/promo/:id/comments",
            post(user::add_comment).get(user::list_comments),
        )
        .route(
            "/api/user/promo/:id/comments/:comment_id",
            get(user::get_comment)
                .put(user::edit_comment)
                .delete(user::delete_comment),
        )
        .route("/api/user/promo/:id/activate", post(user::activate))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let public_routes = Router::new()
        .route("/api/ping", get(health::ping))
        .route("/api/health", get(health::health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/business/auth/sign-up", post(auth::business_sign_up))
        .route("/api/business/auth/sign-in", post(auth::business_sign_in))
        .route("/api/user/auth/sign-up", post(auth::user_sign_up))
        .route("/api/user/auth/sign-in", post(auth::user_sign_in));

    Router::new()
        .merge(public_routes)
        .merge(business_routes)
        .merge(user_routes)
        // Bottom layers run first.
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
