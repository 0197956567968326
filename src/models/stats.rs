use serde::Deserialize;

/// Progress and telemetry snapshot for a running statement.
///
/// Replaced wholesale on every fetched page; never merged across pages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StmtStats {
    pub state: String,
    #[serde(rename = "progressPercentage")]
    pub progress_percentage: f32,
    pub scheduled: bool,
    pub nodes: i64,
    #[serde(rename = "totalSplits")]
    pub total_splits: i64,
    #[serde(rename = "queuedSplits")]
    pub queued_splits: i64,
    #[serde(rename = "runningSplits")]
    pub running_splits: i64,
    #[serde(rename = "completedSplits")]
    pub completed_splits: i64,
    #[serde(rename = "userTimeMillis")]
    pub user_time_millis: i64,
    #[serde(rename = "cpuTimeMillis")]
    pub cpu_time_millis: i64,
    #[serde(rename = "wallTimeMillis")]
    pub wall_time_millis: i64,
    #[serde(rename = "processedRows")]
    pub processed_rows: i64,
    #[serde(rename = "processedBytes")]
    pub processed_bytes: i64,
    #[serde(rename = "rootStage")]
    pub root_stage: Option<StmtStage>,
}

/// One stage in the nested execution-stage tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StmtStage {
    #[serde(rename = "stageId")]
    pub stage_id: String,
    pub state: String,
    pub done: bool,
    pub nodes: i64,
    #[serde(rename = "totalSplits")]
    pub total_splits: i64,
    #[serde(rename = "queuedSplits")]
    pub queued_splits: i64,
    #[serde(rename = "runningSplits")]
    pub running_splits: i64,
    #[serde(rename = "completedSplits")]
    pub completed_splits: i64,
    #[serde(rename = "userTimeMillis")]
    pub user_time_millis: i64,
    #[serde(rename = "cpuTimeMillis")]
    pub cpu_time_millis: i64,
    #[serde(rename = "wallTimeMillis")]
    pub wall_time_millis: i64,
    #[serde(rename = "processedRows")]
    pub processed_rows: i64,
    #[serde(rename = "processedBytes")]
    pub processed_bytes: i64,
    #[serde(rename = "subStages")]
    pub sub_stages: Vec<StmtStage>,
}
