use depot_engine::{DepositNotifier, NotifierError};
use mockall::mock;

mock! {
    pub Notifier {}
    impl DepositNotifier for Notifier {
        async fn notify_user(&self, user: &str, title: &str, message: &str) -> Result<(), NotifierError>;
        async fn post_log(&self, message: &str) -> Result<(), NotifierError>;
    }
}
