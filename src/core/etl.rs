use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let name = self.pipeline.name();
        tracing::info!("Starting {}...", name);
        self.monitor.log_phase("start");

        tracing::debug!("{}: extract", name);
        let extracted = self.pipeline.extract().await?;
        self.monitor.log_phase("extract");

        tracing::debug!("{}: transform", name);
        let transformed = self.pipeline.transform(extracted).await?;
        self.monitor.log_phase("transform");

        tracing::debug!("{}: load", name);
        let output = self.pipeline.load(transformed).await?;
        self.monitor.log_phase("load");
        self.monitor.log_final();

        tracing::info!("{} finished: {}", name, output);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingPipeline {
        fail_transform: bool,
        phases: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl Pipeline for RecordingPipeline {
        type Extracted = Vec<u32>;
        type Transformed = u32;

        fn name(&self) -> &str {
            "recording"
        }

        async fn extract(&self) -> Result<Vec<u32>> {
            self.phases.lock().unwrap().push("extract");
            Ok(vec![1, 2, 3])
        }

        async fn transform(&self, data: Vec<u32>) -> Result<u32> {
            self.phases.lock().unwrap().push("transform");
            if self.fail_transform {
                return Err(EtlError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(data.iter().sum())
        }

        async fn load(&self, result: u32) -> Result<String> {
            self.phases.lock().unwrap().push("load");
            Ok(format!("sum={}", result))
        }
    }

    #[tokio::test]
    async fn test_runs_phases_in_order() {
        let engine = EtlEngine::new(RecordingPipeline {
            fail_transform: false,
            phases: Mutex::new(Vec::new()),
        });

        assert_eq!(engine.run().await.unwrap(), "sum=6");
        assert_eq!(
            *engine.pipeline().phases.lock().unwrap(),
            vec!["extract", "transform", "load"]
        );
    }

    #[tokio::test]
    async fn test_stops_at_failing_phase() {
        let engine = EtlEngine::new_with_monitoring(
            RecordingPipeline {
                fail_transform: true,
                phases: Mutex::new(Vec::new()),
            },
            true,
        );

        assert!(engine.run().await.is_err());
        assert_eq!(
            *engine.pipeline().phases.lock().unwrap(),
            vec!["extract", "transform"]
        );
    }
}
