extern crate kiln;

use kiln::prelude::*;
use kiln::video::errors::Result;

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: Log,
    state: NodeState,
    consume: bool,
    dimensions: Option<(u32, u32)>,
}

impl Recorder {
    fn new(name: &'static str, log: &Log) -> Self {
        Recorder {
            name,
            log: log.clone(),
            state: NodeState::default(),
            consume: false,
            dimensions: None,
        }
    }

    fn record(&self, what: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.name, what));
    }
}

impl Node for Recorder {
    fn display(&mut self, _: &mut RenderContext) -> Result<()> {
        self.record("display");
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.dimensions = Some((width, height));
        self.record("resize");
    }

    fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    fn render_time_nanos(&self) -> u64 {
        self.state.last_render_time_nanos
    }

    fn polygons_rendered(&self) -> u32 {
        self.state.last_polygon_count
    }

    fn on_key_press(&mut self, _: KeyCode) -> bool {
        self.record("key");
        self.consume
    }

    fn on_mouse_move(&mut self, dx: i32, x: i32, dy: i32, y: i32) {
        self.record(&format!("move({},{},{},{})", dx, x, dy, y));
    }

    fn on_mouse_enter(&mut self) {
        self.record("enter");
    }

    fn on_mouse_exit(&mut self) {
        self.record("exit");
    }
}

fn recorders(
    pipeline: &mut Pipeline,
    log: &Log,
    names: &[&'static str],
) -> Vec<Rc<RefCell<Recorder>>> {
    names
        .iter()
        .map(|&name| {
            let recorder = Rc::new(RefCell::new(Recorder::new(name, log)));
            pipeline.add(recorder.clone());
            recorder
        })
        .collect()
}

fn draw(pipeline: &mut Pipeline) {
    let mut backend = HeadlessBackend::new();
    let reclaimer = Reclaimer::new(1);
    let mut scopes = ScopeTracker::new();
    let clock = FrameClock::new();

    let mut ctx = RenderContext::new(
        &mut backend,
        &reclaimer,
        &mut scopes,
        &clock,
        pipeline.dimensions(),
    );

    pipeline.draw_all(&mut ctx).unwrap();
}

#[test]
fn resized_on_add() {
    let log = Log::default();
    let mut pipeline = Pipeline::new(Vector2::new(640, 480));
    let nodes = recorders(&mut pipeline, &log, &["a"]);

    assert_eq!(nodes[0].borrow().dimensions, Some((640, 480)));
    assert_eq!(pipeline.len(), 1);
}

#[test]
fn draw_order() {
    let log = Log::default();
    let mut pipeline = Pipeline::new(Vector2::new(1, 1));
    recorders(&mut pipeline, &log, &["a", "b", "c"]);
    log.borrow_mut().clear();

    draw(&mut pipeline);
    assert_eq!(*log.borrow(), vec!["a:display", "b:display", "c:display"]);
}

#[test]
fn input_in_reverse_order() {
    let log = Log::default();
    let mut pipeline = Pipeline::new(Vector2::new(1, 1));
    let nodes = recorders(&mut pipeline, &log, &["a", "b", "c"]);
    log.borrow_mut().clear();

    assert!(InputEvent::KeyPressed { key: 1 }.is_claimable());
    assert!(!InputEvent::MouseEntered.is_claimable());

    assert!(!pipeline.dispatch_input(&InputEvent::KeyPressed { key: 1 }));
    assert_eq!(*log.borrow(), vec!["c:key", "b:key", "a:key"]);

    log.borrow_mut().clear();
    nodes[1].borrow_mut().consume = true;
    assert!(pipeline.dispatch_input(&InputEvent::KeyPressed { key: 1 }));
    assert_eq!(*log.borrow(), vec!["c:key", "b:key"]);
}

#[test]
fn pointer_broadcasts() {
    let log = Log::default();
    let mut pipeline = Pipeline::new(Vector2::new(1, 1));
    recorders(&mut pipeline, &log, &["a", "b"]);
    log.borrow_mut().clear();

    assert!(!pipeline.dispatch_input(&InputEvent::KeyPressed { key: 1 }));
    assert!(!pipeline.dispatch_input(&InputEvent::MouseEntered));
    pipeline.mouse_moved(3, 13, -2, 8);
    assert!(!pipeline.dispatch_input(&InputEvent::MouseExited));

    // Only movement goes front to back.
    assert_eq!(
        *log.borrow(),
        vec![
            "b:key",
            "a:key",
            "b:enter",
            "a:enter",
            "a:move(3,13,-2,8)",
            "b:move(3,13,-2,8)",
            "b:exit",
            "a:exit",
        ]
    );
}

#[test]
fn disabled_nodes() {
    let log = Log::default();
    let mut pipeline = Pipeline::new(Vector2::new(1, 1));
    let nodes = recorders(&mut pipeline, &log, &["a", "b", "c"]);

    for (i, v) in nodes.iter().enumerate() {
        let mut v = v.borrow_mut();
        v.state.last_render_time_nanos = 10 * (i as u64 + 1);
        v.state.last_polygon_count = 100 * (i as u32 + 1);
    }

    nodes[1].borrow_mut().state.enabled = false;
    log.borrow_mut().clear();

    draw(&mut pipeline);
    assert_eq!(pipeline.render_time_nanos(), 40);
    assert_eq!(pipeline.polygons_rendered(), 400);

    assert!(!pipeline.dispatch_input(&InputEvent::KeyPressed { key: 7 }));
    pipeline.resize(800, 600);

    assert_eq!(
        *log.borrow(),
        vec![
            "a:display", "c:display", "c:key", "a:key", "a:resize", "b:resize", "c:resize",
        ]
    );
    assert_eq!(nodes[1].borrow().dimensions, Some((800, 600)));
    assert_eq!(pipeline.dimensions(), Vector2::new(800, 600));
}

#[test]
fn remove_keeps_order() {
    let log = Log::default();
    let mut pipeline = Pipeline::new(Vector2::new(1, 1));
    let nodes = recorders(&mut pipeline, &log, &["a", "b", "c"]);

    let b: NodeRef = nodes[1].clone();
    assert!(pipeline.remove(&b));
    assert!(!pipeline.contains(&b));

    log.borrow_mut().clear();
    draw(&mut pipeline);
    assert_eq!(*log.borrow(), vec!["a:display", "c:display"]);

    pipeline.clear();
    assert!(pipeline.is_empty());
}

#[test]
fn metrics_saturate() {
    let log = Log::default();
    let mut pipeline = Pipeline::new(Vector2::new(1, 1));
    let nodes = recorders(&mut pipeline, &log, &["a", "b"]);

    for v in &nodes {
        let mut v = v.borrow_mut();
        v.state.last_render_time_nanos = u64::max_value() - 1;
        v.state.last_polygon_count = u32::max_value() - 1;
    }

    draw(&mut pipeline);
    assert_eq!(pipeline.render_time_nanos(), u64::max_value());
    assert_eq!(pipeline.polygons_rendered(), u32::max_value());
}
