use tabled::Tabled;

#[derive(Tabled)]
pub struct DatasetRow {
    pub dataset: String,
    #[tabled(rename = "runs ok")]
    pub successful_runs: String,
    #[tabled(display = "float3")]
    pub mean_runtime_s: f64,
    #[tabled(display = "float3")]
    pub min_runtime_s: f64,
    #[tabled(display = "float3")]
    pub max_runtime_s: f64,
    #[tabled(display = "float2")]
    pub mean_memory_mb: f64,
    #[tabled(display = "float2")]
    pub max_memory_mb: f64,
    #[tabled(display = "float3")]
    pub success_rate: f64,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}

fn float3(n: &f64) -> String {
    format!("{:.3}", n)
}
