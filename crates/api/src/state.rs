use mongodb::Database;
use peopledesk_config::Settings;
use peopledesk_services::{
    AuthService, FeedbackAnalyzer, LocalObjectStore, ObjectStore,
    chat::NotificationCenter,
    dao::{
        announcement::AnnouncementDao, chat::ChatDao, document::DocumentDao,
        employee::EmployeeDao, leave_request::LeaveRequestDao, resignation::ResignationDao,
        team::TeamDao, user::UserDao, wifi_bill::WifiBillDao,
    },
};
use std::sync::Arc;

use crate::ws::storage::WsStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub employees: Arc<EmployeeDao>,
    pub leave_requests: Arc<LeaveRequestDao>,
    pub resignations: Arc<ResignationDao>,
    pub teams: Arc<TeamDao>,
    pub documents: Arc<DocumentDao>,
    pub chat: Arc<ChatDao>,
    pub wifi_bills: Arc<WifiBillDao>,
    pub announcements: Arc<AnnouncementDao>,
    pub store: Arc<dyn ObjectStore>,
    pub feedback: FeedbackAnalyzer,
    pub notifications: Arc<NotificationCenter>,
    pub ws_storage: Arc<WsStorage>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let store = LocalObjectStore::new(
            settings.storage.root.clone(),
            settings.storage.max_upload_bytes,
        );

        Self {
            auth: Arc::new(AuthService::new(settings.jwt.clone())),
            users: Arc::new(UserDao::new(&db)),
            employees: Arc::new(EmployeeDao::new(&db)),
            leave_requests: Arc::new(LeaveRequestDao::new(&db)),
            resignations: Arc::new(ResignationDao::new(&db)),
            teams: Arc::new(TeamDao::new(&db)),
            documents: Arc::new(DocumentDao::new(&db)),
            chat: Arc::new(ChatDao::new(&db)),
            wifi_bills: Arc::new(WifiBillDao::new(&db)),
            announcements: Arc::new(AnnouncementDao::new(&db)),
            store: Arc::new(store),
            feedback: FeedbackAnalyzer::new(&settings.ai),
            notifications: Arc::new(NotificationCenter::new(
                settings.chat.notification_dedup_capacity,
            )),
            ws_storage: Arc::new(WsStorage::new()),
            db,
            settings,
        }
    }

    pub fn fetch_limit(&self) -> u32 {
        self.settings.listing.fetch_limit
    }
}
