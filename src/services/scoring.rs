use crate::models::{Evaluation, EvaluationCriteria, Role, ScoreBreakdown};

/// Nota de um aluno numa sessão.
///
/// - média dos pares: média por critério das avaliações de alunos, ou zero;
/// - nota do instrutor: a primeira avaliação de instrutor encontrada (sem média), ou zero;
/// - nota final: média simples entre as duas.
///
/// Categoria ausente entra como zero e puxa a nota final para baixo.
pub fn calculate_scores(evaluations: &[Evaluation], session_id: &str, student_id: &str) -> ScoreBreakdown {
    let relevant: Vec<&Evaluation> = evaluations
        .iter()
        .filter(|e| e.session_id == session_id && e.student_id == student_id)
        .collect();

    let (instructor, peers): (Vec<&Evaluation>, Vec<&Evaluation>) = relevant
        .into_iter()
        .partition(|e| e.evaluator_role == Role::Instructor);

    let peer_average = EvaluationCriteria::mean(peers.iter().map(|e| &e.criteria));
    let instructor_score = instructor
        .first()
        .map(|e| e.criteria)
        .unwrap_or(EvaluationCriteria::ZERO);

    let final_score = EvaluationCriteria::mean([&peer_average, &instructor_score]);

    ScoreBreakdown {
        peer_average,
        instructor_score,
        final_score,
        peer_count: peers.len(),
        instructor_count: instructor.len(),
    }
}
