use thiserror::Error;

/// A failed pipeline step. The run stops at the first one.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Could not authenticate to HP ALM")]
    Authentication(#[source] anyhow::Error),

    #[error("Could not produce HP ALM query")]
    QueryBuild(#[source] anyhow::Error),

    #[error("Could not execute HP ALM query")]
    Fetch(#[source] anyhow::Error),

    #[error("Could not generate summary HTML table for Confluence")]
    Render(#[source] anyhow::Error),

    #[error("Could not update Confluence page")]
    Publish(#[source] anyhow::Error),

    #[error("Could not generate changes file")]
    ChangelogWrite(#[source] anyhow::Error),

    #[error("Could not update HP ALM entities")]
    Update(#[source] anyhow::Error),
}

impl StepError {
    pub fn step(&self) -> &'static str {
        match self {
            StepError::Authentication(_) => "authenticate",
            StepError::QueryBuild(_) => "query",
            StepError::Fetch(_) => "fetch",
            StepError::Render(_) => "render",
            StepError::Publish(_) => "publish",
            StepError::ChangelogWrite(_) => "changes",
            StepError::Update(_) => "update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_cause_in_chain() {
        let err = StepError::Fetch(anyhow::anyhow!("Response code: 500"));
        let report = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(report, "Could not execute HP ALM query: Response code: 500");
    }

    #[test]
    fn names_the_failed_step() {
        let err = StepError::Publish(anyhow::anyhow!("boom"));
        assert_eq!(err.step(), "publish");
    }
}
