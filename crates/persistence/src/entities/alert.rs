use sqlx::FromRow;

/// Alert subscriber joined with the latest reading of their district.
#[derive(Debug, Clone, FromRow)]
pub struct AlertCandidateEntity {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub threshold: i32,
    pub district_name: String,
    pub aqi: Option<i32>,
    pub pm25: Option<f64>,
    pub temperature: Option<f64>,
}

impl From<AlertCandidateEntity> for domain::models::AlertCandidate {
    fn from(entity: AlertCandidateEntity) -> Self {
        Self {
            user_id: entity.user_id,
            username: entity.username,
            email: entity.email,
            threshold: entity.threshold,
            district_name: entity.district_name,
            aqi: entity.aqi,
            pm25: entity.pm25,
            temperature: entity.temperature,
        }
    }
}
