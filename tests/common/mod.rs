//! Shared helpers for integration tests

#![allow(dead_code)]

use axum::Router;
use chrono::{DateTime, TimeZone, Utc};

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
}

pub const FILLER_CSV: &str = "item_id,sentence,with_question,question,answer1,answer2,question_delay
f1,The weather was pleasant today,false,,,,0
f2,She walked to the store,false,,,,0
";

pub const PRACTICE_CSV: &str = "item_id,sentence,with_question,question,answer1,answer2,question_delay
p1,This is a practice sentence,true,Is this practice?,Yes,No,0
";
