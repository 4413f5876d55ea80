use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::api::{self, ApiClient};
use crate::models::{
    CreateSessionRequest, Evaluation, EvaluationCriteria, ScoreBreakdown, Session,
    SubmitEvaluationRequest, User, UserSessions,
};
use crate::services::auth_service::{AuthEvent, AuthService};
use crate::services::scoring;
use crate::utils::error::{AppError, AppResult};
use crate::utils::loading::LoadingFlag;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum DataEvent {
    Refreshed { sessions: usize, evaluations: usize },
    SessionCreated(Session),
    EvaluationSubmitted(Evaluation),
    Cleared,
    LoadingChanged(bool),
}

#[derive(Default)]
struct EvaluationData {
    sessions: Vec<Session>,
    evaluations: Vec<Evaluation>,
}

/// Provider de sessões e avaliações do usuário corrente.
///
/// Depois de toda mutação bem-sucedida refaz o fetch completo; é isso que
/// converge o estado quando chamadas concorrentes se intercalam.
pub struct EvaluationService {
    auth: Arc<AuthService>,
    api: ApiClient,
    data: RwLock<EvaluationData>,
    loading: LoadingFlag,
    events: broadcast::Sender<DataEvent>,
}

impl EvaluationService {
    pub fn new(auth: Arc<AuthService>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let loading_events = events.clone();
        let loading = LoadingFlag::with_listener(move |busy| {
            let _ = loading_events.send(DataEvent::LoadingChanged(busy));
        });

        Self {
            api: auth.api().clone(),
            auth,
            data: RwLock::new(EvaluationData::default()),
            loading,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.events.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.read_data().sessions.clone()
    }

    pub fn evaluations(&self) -> Vec<Evaluation> {
        self.read_data().evaluations.clone()
    }

    /// Busca sessões e avaliações e substitui as coleções em memória.
    pub async fn refresh(&self) -> AppResult<()> {
        let Some(user) = self.auth.current_user() else {
            self.clear();
            return Ok(());
        };
        let token = self.auth.token().ok_or(AppError::NotAuthenticated)?;

        let _loading = self.loading.begin();
        self.fetch_all(&token, &user.id).await
    }

    pub fn clear(&self) {
        {
            let mut data = self.write_data();
            data.sessions.clear();
            data.evaluations.clear();
        }
        log::debug!("🧹 Evaluation data cleared");
        let _ = self.events.send(DataEvent::Cleared);
    }

    pub async fn create_session(&self, request: CreateSessionRequest) -> AppResult<Session> {
        let user = self.auth.current_user().ok_or(AppError::NotAuthenticated)?;
        if !user.is_instructor() {
            return Err(AppError::PermissionDenied("Only instructors can create sessions".to_string()));
        }
        if request.topic.trim().is_empty() {
            return Err(AppError::InvalidInput("Session topic is required".to_string()));
        }
        let token = self.auth.token().ok_or(AppError::NotAuthenticated)?;

        let _loading = self.loading.begin();
        log::info!("🗓️ Creating session '{}' for group {}", request.topic, request.group_name);

        let raw = api::sessions::create_session(&self.api, &token, &user.id, &request)
            .await
            .map_err(|e| {
                log::warn!("❌ Failed to create session: {}", e);
                e
            })?;
        let session = Session::from(raw);
        log::info!("✅ Session created: {}", session.id);

        if !self.apply_for(&user.id, |data| data.sessions.push(session.clone())) {
            return Ok(session);
        }
        let _ = self.events.send(DataEvent::SessionCreated(session.clone()));

        self.refetch_after_mutation(&user.id).await;
        Ok(session)
    }

    pub async fn submit_evaluation(
        &self,
        session_id: &str,
        student_id: &str,
        criteria: EvaluationCriteria,
    ) -> AppResult<Evaluation> {
        let user = self.auth.current_user().ok_or(AppError::NotAuthenticated)?;
        criteria.validate()?;
        let token = self.auth.token().ok_or(AppError::NotAuthenticated)?;

        let _loading = self.loading.begin();
        log::info!("📝 Submitting evaluation: session {} student {}", session_id, student_id);

        let request = SubmitEvaluationRequest {
            session_id: session_id.to_string(),
            student_id: student_id.to_string(),
            evaluator_id: user.id.clone(),
            criteria,
        };

        let mut raw = api::evaluations::submit_evaluation(&self.api, &token, &request)
            .await
            .map_err(|e| {
                log::warn!("❌ Failed to submit evaluation: {}", e);
                e
            })?;

        // Resposta incompleta: completa com o que foi enviado
        if raw.session_id.is_empty() {
            raw.session_id = request.session_id;
        }
        if raw.student_id.is_empty() {
            raw.student_id = request.student_id;
        }
        if raw.evaluator_id.is_empty() {
            raw.evaluator_id = user.id.clone();
        }
        if raw.criteria.is_none() && raw.articulation.is_none() {
            raw.criteria = Some(criteria);
        }

        let evaluation = raw.normalize(&self.read_data().sessions);
        log::info!("✅ Evaluation submitted: {} ({})", evaluation.id, evaluation.evaluator_role);

        if !self.apply_for(&user.id, |data| data.evaluations.push(evaluation.clone())) {
            return Ok(evaluation);
        }
        let _ = self.events.send(DataEvent::EvaluationSubmitted(evaluation.clone()));

        self.refetch_after_mutation(&user.id).await;
        Ok(evaluation)
    }

    pub fn get_session_by_id(&self, id: &str) -> Option<Session> {
        self.read_data().sessions.iter().find(|s| s.id == id).cloned()
    }

    pub fn get_sessions_for_user(&self) -> UserSessions {
        match self.auth.current_user() {
            Some(user) => sessions_for_user(&self.read_data().sessions, &user),
            None => UserSessions::default(),
        }
    }

    pub fn get_evaluations_for_session(&self, session_id: &str) -> Vec<Evaluation> {
        self.read_data()
            .evaluations
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect()
    }

    pub fn calculate_scores(&self, session_id: &str, student_id: &str) -> ScoreBreakdown {
        scoring::calculate_scores(&self.read_data().evaluations, session_id, student_id)
    }

    /// Acompanha o provider de auth: login recarrega, logout limpa.
    pub async fn handle_auth_event(&self, event: &AuthEvent) {
        match event {
            AuthEvent::SignedIn(user) => {
                log::debug!("Auth signed in {}, refreshing evaluation data", user.email);
                if let Err(e) = self.refresh().await {
                    log::warn!("⚠️ Failed to load evaluation data after sign-in: {}", e);
                }
            }
            AuthEvent::SignedOut => self.clear(),
            AuthEvent::ProfileUpdated(_) | AuthEvent::LoadingChanged(_) => {}
        }
    }

    pub fn spawn_auth_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.auth.subscribe();
        let service = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => service.handle_auth_event(&event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("⚠️ Auth listener lagged by {} events, resyncing", skipped);
                        if let Err(e) = service.refresh().await {
                            log::warn!("⚠️ Resync failed: {}", e);
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    async fn fetch_all(&self, token: &str, user_id: &str) -> AppResult<()> {
        log::info!("🔄 Fetching sessions and evaluations...");

        let (raw_sessions, raw_evaluations) = futures::try_join!(
            api::sessions::fetch_sessions(&self.api, token),
            api::evaluations::fetch_evaluations(&self.api, token),
        )
        .map_err(|e| {
            log::error!("❌ Failed to fetch evaluation data: {}", e);
            e
        })?;

        let sessions: Vec<Session> = raw_sessions.into_iter().map(Session::from).collect();
        let evaluations: Vec<Evaluation> = raw_evaluations
            .into_iter()
            .map(|raw| raw.normalize(&sessions))
            .collect();

        let (session_count, evaluation_count) = (sessions.len(), evaluations.len());
        let applied = self.apply_for(user_id, |data| {
            data.sessions = sessions;
            data.evaluations = evaluations;
        });
        if !applied {
            return Ok(());
        }

        log::info!("✅ Loaded {} sessions and {} evaluations", session_count, evaluation_count);
        let _ = self.events.send(DataEvent::Refreshed {
            sessions: session_count,
            evaluations: evaluation_count,
        });
        Ok(())
    }

    // A mutação já foi aplicada localmente; falha aqui só é logada
    async fn refetch_after_mutation(&self, user_id: &str) {
        let token = match self.auth.token() {
            Some(token) if self.signed_in_as(user_id) => token,
            _ => {
                log::debug!("Signed out after mutation, skipping re-fetch");
                return;
            }
        };

        if let Err(e) = self.fetch_all(&token, user_id).await {
            log::warn!("⚠️ Re-fetch after mutation failed, keeping local state: {}", e);
        }
    }

    fn signed_in_as(&self, user_id: &str) -> bool {
        self.auth.current_user().map_or(false, |user| user.id == user_id)
    }

    /// Aplica uma resposta ao estado local se quem fez a requisição ainda está logado.
    ///
    /// A checagem acontece com o lock de escrita tomado, então um `clear()`
    /// posterior ao logout sempre vence.
    fn apply_for<F>(&self, user_id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut EvaluationData),
    {
        let mut data = self.write_data();
        if !self.signed_in_as(user_id) {
            log::info!("🚫 User signed out mid-request, discarding response");
            return false;
        }
        apply(&mut data);
        true
    }

    fn read_data(&self) -> RwLockReadGuard<'_, EvaluationData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_data(&self) -> RwLockWriteGuard<'_, EvaluationData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Instrutor: sessões que criou, todas como "evaluating".
/// Aluno: por matrícula, em participants e/ou evaluators (as duas listas podem se sobrepor).
pub fn sessions_for_user(sessions: &[Session], user: &User) -> UserSessions {
    if user.is_instructor() {
        return UserSessions {
            participating: Vec::new(),
            evaluating: sessions.iter().filter(|s| s.is_created_by(&user.id)).cloned().collect(),
        };
    }

    let Some(roll_number) = user.roll_number.as_deref() else {
        return UserSessions::default();
    };

    UserSessions {
        participating: sessions.iter().filter(|s| s.has_participant(roll_number)).cloned().collect(),
        evaluating: sessions.iter().filter(|s| s.has_evaluator(roll_number)).cloned().collect(),
    }
}
