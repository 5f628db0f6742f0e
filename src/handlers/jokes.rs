//! Protected resource: a fixed joke listing.

use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::middleware::AuthUser;

#[derive(Debug, Clone, Serialize)]
pub struct Joke {
    pub id: &'static str,
    pub joke: &'static str,
}

const JOKES: &[Joke] = &[
    Joke {
        id: "0189hNRf2g",
        joke: "I'm tired of following my dreams. I'm just going to ask them where they are going and meet up with them later.",
    },
    Joke {
        id: "08EQZ8EQukb",
        joke: "Did you hear about the guy whose whole left side was cut off? He's all right now.",
    },
    Joke {
        id: "08xHQCdx5Ed",
        joke: "Why didn't the skeleton cross the road? Because he had no guts.",
    },
];

/// GET /jokes (behind the token gate)
pub async fn list_jokes(AuthUser(claims): AuthUser) -> Json<&'static [Joke]> {
    debug!(user_id = claims.subject, "serving jokes");
    Json(JOKES)
}
