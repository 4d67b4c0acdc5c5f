//! Before/after listener bridge wrapped around non-cached executions.

use transform_model::TransformationSubject;

/// Fired around every non-cached execution; cached retrievals fire neither
/// event.
pub trait TransformerInvocationListener: Send + Sync {
    fn before_transformer_invocation(&self, transformer_display_name: &str, subject: &TransformationSubject);
    fn after_transformer_invocation(&self, transformer_display_name: &str, subject: &TransformationSubject);
}

/// RAII guard that pairs `before`/`after` around a non-cached execution.
///
/// `after` fires exactly once when the guard drops, whether that's the
/// success return path, an early `?` return, or unwinding from a panic, so a
/// panicking `execute()` still reports `after` (design note 9, "scoped
/// listener spans").
pub struct InvocationSpan<'a> {
    listener: &'a dyn TransformerInvocationListener,
    transformer_display_name: String,
    subject: TransformationSubject,
}

impl<'a> InvocationSpan<'a> {
    pub fn enter(
        listener: &'a dyn TransformerInvocationListener,
        transformer_display_name: impl Into<String>,
        subject: TransformationSubject,
    ) -> Self {
        let transformer_display_name = transformer_display_name.into();
        listener.before_transformer_invocation(&transformer_display_name, &subject);
        Self {
            listener,
            transformer_display_name,
            subject,
        }
    }
}

impl Drop for InvocationSpan<'_> {
    fn drop(&mut self) {
        self.listener
            .after_transformer_invocation(&self.transformer_display_name, &self.subject);
    }
}
