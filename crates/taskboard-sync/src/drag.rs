use taskboard_core::task::{ColumnId, Task};
use tracing::debug;

use crate::coordinator::MoveTask;

/// Pointer travel (px) before a press turns into a drag.
pub const ACTIVATION_DISTANCE: f32 = 6.0;

/// Payload attached to a drop target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropData {
    Column(ColumnId),
    Task(Task),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub id: String,
    pub data: Option<DropData>,
}

impl DropTarget {
    pub fn column(column: ColumnId) -> Self {
        Self {
            id: column.as_str().to_string(),
            data: Some(DropData::Column(column)),
        }
    }

    pub fn task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            data: Some(DropData::Task(task.clone())),
        }
    }

    /// Column a drop over this target lands in.
    ///
    /// Priority: column payload, then the hovered task's column, then the
    /// raw id read as a column id.
    pub fn destination(&self) -> Option<ColumnId> {
        match &self.data {
            Some(DropData::Column(column)) => Some(*column),
            Some(DropData::Task(task)) => Some(task.column),
            None => ColumnId::parse_str(&self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Start {
        source_id: String,
        /// Task attached to the drag source. Without it the drag is inert.
        task: Option<Task>,
    },
    End {
        over: Option<DropTarget>,
    },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task: Task,
    },
}

/// Turns raw drag events into move requests.
#[derive(Debug, Default)]
pub struct DragOrchestrator {
    state: DragState,
}

impl DragOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn dragging_task_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { task } => Some(&task.id),
            DragState::Idle => None,
        }
    }

    /// Feed one event. Returns a move only for a drop that lands in a
    /// column other than the dragged task's own.
    pub fn handle(&mut self, event: DragEvent) -> Option<MoveTask> {
        match event {
            DragEvent::Start { source_id, task } => {
                match task {
                    Some(task) => self.state = DragState::Dragging { task },
                    None => debug!("drag from {source_id} carries no task; ignoring"),
                }
                None
            }
            DragEvent::End { over } => {
                let DragState::Dragging { task } = std::mem::take(&mut self.state) else {
                    return None;
                };
                let to = over.as_ref().and_then(DropTarget::destination)?;
                if to == task.column {
                    return None;
                }
                Some(MoveTask::new(&task, to))
            }
            DragEvent::Cancel => {
                self.state = DragState::Idle;
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn corners(&self) -> [Point; 4] {
        let (right, bottom) = (self.x + self.width, self.y + self.height);
        [
            Point::new(self.x, self.y),
            Point::new(right, self.y),
            Point::new(self.x, bottom),
            Point::new(right, bottom),
        ]
    }
}

/// Drop target whose corners are nearest, on average, to the dragged
/// rectangle's corners.
pub fn closest_corners<'a>(dragged: &Rect, candidates: &'a [(DropTarget, Rect)]) -> Option<&'a DropTarget> {
    let corners = dragged.corners();
    candidates
        .iter()
        .map(|(target, rect)| {
            let sum: f32 = corners
                .iter()
                .zip(rect.corners())
                .map(|(a, b)| a.distance(b))
                .sum();
            (target, sum / 4.0)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(target, _)| target)
}

/// Press/move/release tracker that only activates a drag once the
/// pointer has travelled `activation_distance` from the press point.
#[derive(Debug, Clone)]
pub struct PointerSensor {
    activation_distance: f32,
    origin: Option<Point>,
    active: bool,
}

impl Default for PointerSensor {
    fn default() -> Self {
        Self::new(ACTIVATION_DISTANCE)
    }
}

impl PointerSensor {
    pub fn new(activation_distance: f32) -> Self {
        Self {
            activation_distance,
            origin: None,
            active: false,
        }
    }

    pub fn press(&mut self, at: Point) {
        self.origin = Some(at);
        self.active = false;
    }

    /// True exactly once: on the move that crosses the threshold.
    pub fn motion(&mut self, at: Point) -> bool {
        match self.origin {
            Some(origin) if !self.active && origin.distance(at) >= self.activation_distance => {
                self.active = true;
                true
            }
            _ => false,
        }
    }

    /// Returns whether the released gesture was a drag rather than a click.
    pub fn release(&mut self) -> bool {
        self.origin = None;
        std::mem::take(&mut self.active)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use taskboard_core::task::Priority;

    use super::*;

    fn task(id: &str, column: ColumnId) -> Task {
        Task {
            id: id.into(),
            title: "Write docs".into(),
            description: String::new(),
            column,
            priority: Priority::Low,
            created_at: Utc::now(),
        }
    }

    fn start(t: &Task) -> DragEvent {
        DragEvent::Start {
            source_id: t.id.clone(),
            task: Some(t.clone()),
        }
    }

    #[test]
    fn drop_on_other_column_requests_move() {
        let t = task("t1", ColumnId::Backlog);
        let mut drag = DragOrchestrator::new();
        assert_eq!(drag.handle(start(&t)), None);
        assert_eq!(drag.dragging_task_id(), Some("t1"));

        let request = drag.handle(DragEvent::End {
            over: Some(DropTarget::column(ColumnId::Done)),
        });
        assert_eq!(
            request,
            Some(MoveTask {
                task_id: "t1".into(),
                from: ColumnId::Backlog,
                to: ColumnId::Done,
            })
        );
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn drop_on_task_uses_its_column() {
        let t = task("t1", ColumnId::Backlog);
        let other = task("t2", ColumnId::Review);
        let mut drag = DragOrchestrator::new();
        drag.handle(start(&t));
        let request = drag.handle(DragEvent::End {
            over: Some(DropTarget::task(&other)),
        });
        assert_eq!(request.map(|m| m.to), Some(ColumnId::Review));
    }

    #[test]
    fn bare_id_resolves_only_when_it_names_a_column() {
        let bare = |id: &str| DropTarget {
            id: id.into(),
            data: None,
        };
        assert_eq!(bare("in_progress").destination(), Some(ColumnId::InProgress));
        assert_eq!(bare("sidebar").destination(), None);

        let t = task("t1", ColumnId::Backlog);
        let mut drag = DragOrchestrator::new();
        drag.handle(start(&t));
        assert_eq!(drag.handle(DragEvent::End { over: Some(bare("sidebar")) }), None);
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn same_column_and_no_target_are_ignored() {
        let t = task("t1", ColumnId::Review);
        let mut drag = DragOrchestrator::new();
        drag.handle(start(&t));
        assert_eq!(
            drag.handle(DragEvent::End {
                over: Some(DropTarget::column(ColumnId::Review)),
            }),
            None
        );
        drag.handle(start(&t));
        assert_eq!(drag.handle(DragEvent::End { over: None }), None);
    }

    #[test]
    fn inert_start_and_cancel_never_move() {
        let mut drag = DragOrchestrator::new();
        drag.handle(DragEvent::Start {
            source_id: "ghost".into(),
            task: None,
        });
        assert_eq!(drag.state(), &DragState::Idle);
        assert_eq!(
            drag.handle(DragEvent::End {
                over: Some(DropTarget::column(ColumnId::Done)),
            }),
            None
        );

        drag.handle(start(&task("t1", ColumnId::Backlog)));
        assert_eq!(drag.handle(DragEvent::Cancel), None);
        assert_eq!(drag.dragging_task_id(), None);
    }

    #[test]
    fn closest_corners_picks_nearest_column() {
        let columns = vec![
            (DropTarget::column(ColumnId::Backlog), Rect::new(0.0, 0.0, 200.0, 600.0)),
            (DropTarget::column(ColumnId::InProgress), Rect::new(220.0, 0.0, 200.0, 600.0)),
            (DropTarget::column(ColumnId::Review), Rect::new(440.0, 0.0, 200.0, 600.0)),
        ];
        let card = Rect::new(230.0, 40.0, 180.0, 60.0);
        let hit = closest_corners(&card, &columns).and_then(DropTarget::destination);
        assert_eq!(hit, Some(ColumnId::InProgress));
        assert!(closest_corners(&card, &[]).is_none());
    }

    #[test]
    fn sensor_waits_for_activation_distance() {
        let mut sensor = PointerSensor::default();
        sensor.press(Point::new(10.0, 10.0));
        assert!(!sensor.motion(Point::new(13.0, 13.0)));
        assert!(!sensor.is_active());
        assert!(sensor.motion(Point::new(16.0, 10.0)));
        assert!(!sensor.motion(Point::new(40.0, 10.0)));
        assert!(sensor.release());

        sensor.press(Point::new(0.0, 0.0));
        assert!(!sensor.release());
    }
}
