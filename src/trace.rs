//! Recorded monitor callbacks.
//!
//! A trace captures the sequence of calls a tessellator made on a [`Monitor`] so the same run
//! can be rendered again later, or elsewhere, without the tessellator.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    config::Config,
    foundation::error::{MonitorError, MonitorResult},
    geometry::{GeoPoint, Polygon, Triangle},
    monitor::{Monitor, TriangulationMonitor},
    render::text::TextOverlay,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    CurrentState {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        points: Option<Vec<GeoPoint>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        triangles: Option<Vec<Triangle>>,
    },
    StartSplit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
        left: Vec<GeoPoint>,
        right: Vec<GeoPoint>,
    },
    EndSplit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },
}

impl MonitorEvent {
    pub fn apply(&self, monitor: &mut dyn Monitor) -> MonitorResult<()> {
        match self {
            Self::CurrentState {
                status,
                points,
                triangles,
            } => monitor.current_state(
                status.as_deref(),
                points.as_deref(),
                triangles.as_deref(),
            ),
            Self::StartSplit {
                status,
                left,
                right,
            } => monitor.start_split(status.as_deref(), left, right),
            Self::EndSplit { status } => monitor.end_split(status.as_deref()),
        }
    }

    /// Frames a [`TriangulationMonitor`] writes for this event.
    pub fn frame_count(&self) -> u64 {
        match self {
            Self::CurrentState { .. } => 1,
            Self::StartSplit { .. } => 2 * crate::monitor::SPLIT_HOLD_FRAMES as u64,
            Self::EndSplit { .. } => 0,
        }
    }
}

/// One polygon and the calls made while tessellating it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TraceRun {
    pub name: String,
    pub polygon: Polygon,
    #[serde(default)]
    pub events: Vec<MonitorEvent>,
}

impl TraceRun {
    pub fn replay_into(&self, monitor: &mut dyn Monitor) -> MonitorResult<()> {
        for event in &self.events {
            event.apply(monitor)?;
        }
        Ok(())
    }

    /// Render the run into `<config.root>/<name>/`, returning the number of frames written.
    pub fn render(&self, config: &Config, text: TextOverlay) -> MonitorResult<u64> {
        let mut monitor = TriangulationMonitor::with_text_overlay(
            &self.name,
            self.polygon.clone(),
            config,
            text,
        )?;
        self.replay_into(&mut monitor)?;
        Ok(monitor.frames_written())
    }

    /// Frames [`TraceRun::render`] produces, including the initial one.
    pub fn expected_frames(&self) -> u64 {
        1 + self.events.iter().map(MonitorEvent::frame_count).sum::<u64>()
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trace {
    pub runs: Vec<TraceRun>,
}

impl Trace {
    pub fn from_json_str(s: &str) -> MonitorResult<Self> {
        serde_json::from_str(s).map_err(|e| MonitorError::serde(e.to_string()))
    }

    pub fn from_path(path: &Path) -> MonitorResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("failed to open trace '{}'", path.display()))?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| MonitorError::serde(format!("trace '{}': {e}", path.display())))
    }

    pub fn to_json_string(&self) -> MonitorResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| MonitorError::serde(e.to_string()))
    }
}

/// A [`Monitor`] that only remembers what it was told.
///
/// Calls are recorded verbatim; no lifecycle checks are made, so a recording reproduces
/// exactly what the tessellator did.
#[derive(Clone, Debug, Default)]
pub struct TraceRecorder {
    events: Vec<MonitorEvent>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MonitorEvent] {
        &self.events
    }

    pub fn into_run(self, name: impl Into<String>, polygon: Polygon) -> TraceRun {
        TraceRun {
            name: name.into(),
            polygon,
            events: self.events,
        }
    }
}

impl Monitor for TraceRecorder {
    fn current_state(
        &mut self,
        status: Option<&str>,
        points: Option<&[GeoPoint]>,
        triangles: Option<&[Triangle]>,
    ) -> MonitorResult<()> {
        self.events.push(MonitorEvent::CurrentState {
            status: status.map(str::to_string),
            points: points.map(<[GeoPoint]>::to_vec),
            triangles: triangles.map(<[Triangle]>::to_vec),
        });
        Ok(())
    }

    fn start_split(
        &mut self,
        status: Option<&str>,
        left: &[GeoPoint],
        right: &[GeoPoint],
    ) -> MonitorResult<()> {
        self.events.push(MonitorEvent::StartSplit {
            status: status.map(str::to_string),
            left: left.to_vec(),
            right: right.to_vec(),
        });
        Ok(())
    }

    fn end_split(&mut self, status: Option<&str>) -> MonitorResult<()> {
        self.events.push(MonitorEvent::EndSplit {
            status: status.map(str::to_string),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::from_lon_lat(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]).unwrap()
    }

    #[test]
    fn events_use_tagged_snake_case_json() {
        let json = r#"{
            "runs": [{
                "name": "sq",
                "polygon": {"ring": [[0,0],[10,0],[10,10],[0,10]]},
                "events": [
                    {"event": "current_state", "status": "EARCUT"},
                    {"event": "start_split", "left": [[0,0],[10,0]], "right": [[10,10],[0,10]]},
                    {"event": "end_split"},
                    {"event": "current_state", "triangles": [
                        {"vertices": [[0,0],[10,0],[10,10]], "edge_from_polygon": [true,true,false]}
                    ]}
                ]
            }]
        }"#;
        let trace = Trace::from_json_str(json).unwrap();
        let run = &trace.runs[0];
        assert_eq!(run.events.len(), 4);
        assert_eq!(
            run.events[0],
            MonitorEvent::CurrentState {
                status: Some("EARCUT".to_string()),
                points: None,
                triangles: None,
            }
        );
        assert_eq!(run.expected_frames(), 1 + 1 + 6 + 0 + 1);

        let again = Trace::from_json_str(&trace.to_json_string().unwrap()).unwrap();
        assert_eq!(again, trace);
    }

    #[test]
    fn unknown_event_is_a_serde_error() {
        let json = r#"{"runs":[{"name":"x","polygon":{"ring":[[0,0],[1,0],[1,1]]},
            "events":[{"event":"explode"}]}]}"#;
        let err = Trace::from_json_str(json).unwrap_err();
        assert!(matches!(err, MonitorError::Serde(_)));
    }

    #[test]
    fn recorder_replays_into_another_recorder() {
        let mut rec = TraceRecorder::new();
        let left = [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0)];
        let right = [GeoPoint::new(1.0, 1.0)];
        rec.current_state(Some("a"), Some(&left), None).unwrap();
        rec.start_split(None, &left, &right).unwrap();
        rec.end_split(Some("done")).unwrap();
        let run = rec.into_run("r", square());

        let mut copy = TraceRecorder::new();
        run.replay_into(&mut copy).unwrap();
        assert_eq!(copy.events(), run.events.as_slice());
    }

    #[test]
    fn missing_trace_file_reports_path() {
        let err = Trace::from_path(Path::new("target/does/not/exist.json")).unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.json"));
    }
}
