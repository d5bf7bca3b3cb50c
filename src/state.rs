use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CashService, EventService, Mailer, MembershipService, NonMemberService,
    PasswordResetService, ProfileService, RaffleService, SeaOrmAuthService, SeaOrmCashService,
    SeaOrmEventService, SeaOrmMembershipService, SeaOrmNonMemberService, SeaOrmProfileService,
    SeaOrmRaffleService, SeaOrmTransactionService, TransactionService, mailer,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub mailer: Arc<dyn Mailer>,

    pub auth_service: Arc<dyn AuthService>,

    pub membership_service: Arc<dyn MembershipService>,

    pub profile_service: Arc<dyn ProfileService>,

    pub non_member_service: Arc<dyn NonMemberService>,

    pub cash_service: Arc<dyn CashService>,

    pub transaction_service: Arc<dyn TransactionService>,

    pub event_service: Arc<dyn EventService>,

    pub raffle_service: Arc<dyn RaffleService>,

    pub password_reset: Arc<PasswordResetService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer = mailer::from_config(&config.mail);
        Self::with_mailer(config, mailer).await
    }

    /// Build the state around a caller-supplied mailer.
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let timeout = config.server.request_timeout();

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let membership_service = Arc::new(SeaOrmMembershipService::new(
            store.clone(),
            &config,
            mailer.clone(),
        )) as Arc<dyn MembershipService>;

        let profile_service =
            Arc::new(SeaOrmProfileService::new(store.clone(), timeout)) as Arc<dyn ProfileService>;

        let non_member_service = Arc::new(SeaOrmNonMemberService::new(store.clone(), timeout))
            as Arc<dyn NonMemberService>;

        let cash_service =
            Arc::new(SeaOrmCashService::new(store.clone(), timeout)) as Arc<dyn CashService>;

        let transaction_service = Arc::new(SeaOrmTransactionService::new(store.clone(), timeout))
            as Arc<dyn TransactionService>;

        let event_service =
            Arc::new(SeaOrmEventService::new(store.clone(), timeout)) as Arc<dyn EventService>;

        let raffle_service =
            Arc::new(SeaOrmRaffleService::new(store.clone(), timeout)) as Arc<dyn RaffleService>;

        let password_reset = Arc::new(PasswordResetService::new(
            store.clone(),
            &config,
            mailer.clone(),
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            mailer,
            auth_service,
            membership_service,
            profile_service,
            non_member_service,
            cash_service,
            transaction_service,
            event_service,
            raffle_service,
            password_reset,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
