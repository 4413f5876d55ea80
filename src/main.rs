use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use gd_eval_client::models::{ScoreBreakdown, Session};
use gd_eval_client::{AuthService, Config, EvaluationService};

fn print_scores(label: &str, scores: &ScoreBreakdown) {
    let f = &scores.final_score;
    println!(
        "      {:<10} art {:>4.1} | rel {:>4.1} | lead {:>4.1} | nvc {:>4.1} | imp {:>4.1} | overall {:>4.2}  (peers: {}, instructor: {})",
        label,
        f.articulation,
        f.relevance,
        f.leadership,
        f.non_verbal_communication,
        f.impression,
        f.overall(),
        scores.peer_count,
        scores.instructor_count,
    );
}

fn print_session(session: &Session) {
    println!(
        "  • [{}] {} - {} #{} ({})",
        session.id,
        session.topic,
        session.group_name,
        session.group_number.as_deref().unwrap_or("-"),
        session.date.as_deref().unwrap_or("no date"),
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();

    log::info!("🚀 Starting gd-eval client...");
    log::info!("🌐 Backend: {}", config.api_base_url);
    log::info!("💾 Token file: {}", config.token_file.display());

    let auth = Arc::new(AuthService::from_config(&config));
    auth.initialize().await;

    if !auth.is_authenticated() {
        match (env::var("GD_EVAL_EMAIL"), env::var("GD_EVAL_PASSWORD")) {
            (Ok(email), Ok(password)) => {
                auth.login(&email, &password).await?;
            }
            _ => {
                log::warn!("⚠️ Not signed in. Set GD_EVAL_EMAIL and GD_EVAL_PASSWORD to log in.");
                return Ok(());
            }
        }
    }

    let Some(user) = auth.current_user() else {
        return Ok(());
    };

    let evaluations = EvaluationService::new(auth.clone());
    evaluations.refresh().await?;

    println!("👤 {} <{}> ({})", user.name, user.email, user.role);
    let view = evaluations.get_sessions_for_user();

    if user.is_instructor() {
        println!("\nSessions you created ({}):", view.evaluating.len());
        for session in &view.evaluating {
            print_session(session);
            for roll_number in &session.participants {
                let scores = evaluations.calculate_scores(&session.id, roll_number);
                print_scores(roll_number, &scores);
            }
        }
        return Ok(());
    }

    println!("\nParticipating ({}):", view.participating.len());
    for session in &view.participating {
        print_session(session);
        if let Some(roll_number) = user.roll_number.as_deref() {
            print_scores("you", &evaluations.calculate_scores(&session.id, roll_number));
        }
    }

    println!("\nEvaluating ({}):", view.evaluating.len());
    for session in &view.evaluating {
        print_session(session);
        let submitted = evaluations
            .get_evaluations_for_session(&session.id)
            .iter()
            .filter(|e| e.evaluator_id == user.id)
            .count();
        println!("      {} of {} participants evaluated", submitted, session.participants.len());
    }

    Ok(())
}
