extern crate env_logger;
extern crate kiln;

use kiln::prelude::*;
use kiln::video::errors::{Error, Result};

struct Scripted<F: FnMut(&mut RenderContext) -> Result<()>> {
    func: F,
}

impl<F: FnMut(&mut RenderContext) -> Result<()>> Node for Scripted<F> {
    fn display(&mut self, ctx: &mut RenderContext) -> Result<()> {
        (self.func)(ctx)
    }
}

fn scripted<F>(func: F) -> NodeRef
where
    F: FnMut(&mut RenderContext) -> Result<()> + 'static,
{
    node(Scripted { func })
}

fn setup() -> (Orchestrator, Journal) {
    let _ = env_logger::try_init();

    let backend = HeadlessBackend::new();
    let journal = backend.journal();
    let mut slot = Some(backend);

    let orchestrator = Orchestrator::with_backend(Settings::default(), move || {
        Ok(Box::new(slot.take().unwrap_or_default()) as Box<dyn Backend>)
    });

    (orchestrator, journal)
}

#[test]
fn dropped_texture_released_once() {
    let (mut orchestrator, journal) = setup();

    let frames = Rc::new(RefCell::new(0));
    let counter = frames.clone();
    let mut texture: Option<ResourceHandle> = None;

    orchestrator.pipeline_mut().add(scripted(move |ctx| {
        *counter.borrow_mut() += 1;
        match *counter.borrow() {
            1 => texture = Some(ctx.allocate(ResourceKind::Texture)?),
            2 => texture = None,
            _ => {}
        }
        Ok(())
    }));

    let info = orchestrator.render_frame().unwrap();
    assert_eq!(info.reclaimed, 0);
    assert_eq!(info.alive[ResourceKind::Texture.index()], 1);
    let id = match journal.calls()[..] {
        [Call::Advance, Call::Allocate(ResourceKind::Texture, id), Call::Flush] => id,
        ref v => panic!("unexpected {:?}", v),
    };

    // Dropped during the second frame, released by the sweep at its end.
    let info = orchestrator.render_frame().unwrap();
    assert_eq!(info.reclaimed, 1);
    assert_eq!(info.alive[ResourceKind::Texture.index()], 0);
    assert_eq!(journal.released(ResourceKind::Texture), vec![id]);

    for _ in 0..3 {
        assert_eq!(orchestrator.render_frame().unwrap().reclaimed, 0);
    }

    assert_eq!(journal.release_calls(ResourceKind::Texture), 1);
    assert_eq!(*frames.borrow(), 5);
}

#[test]
fn handles_dropped_between_frames() {
    let (mut orchestrator, journal) = setup();

    let a = orchestrator.allocate(ResourceKind::Buffer).unwrap();
    let b = orchestrator.allocate(ResourceKind::Buffer).unwrap();
    let ids = vec![a.id(), b.id()];
    drop(a);
    drop(b);

    assert_eq!(orchestrator.reclaimer().pending(ResourceKind::Buffer), 2);
    orchestrator.render_frame().unwrap();

    assert_eq!(journal.released(ResourceKind::Buffer), ids);
    assert_eq!(journal.release_calls(ResourceKind::Buffer), 1);
}

#[test]
fn frame_timing() {
    let (mut orchestrator, _) = setup();
    assert_eq!(orchestrator.clock().step_millis(), -1.0);

    let info = orchestrator.render_frame().unwrap();
    assert_eq!(info.index, 1);
    assert_eq!(orchestrator.clock().step_millis(), 0.0);
    assert!(orchestrator.clock().blit_parity());

    std::thread::sleep(std::time::Duration::from_millis(2));
    let info = orchestrator.render_frame().unwrap();
    assert_eq!(info.index, 2);
    assert!(orchestrator.clock().step_millis() >= 2.0);
    assert!(!orchestrator.clock().blit_parity());

    orchestrator.render_frame().unwrap();
    assert!(orchestrator.clock().blit_parity());
    assert_eq!(orchestrator.clock().frame_index(), 3);
}

#[test]
fn backend_failure_aborts_frame() {
    let _ = env_logger::try_init();

    let attempts = Rc::new(RefCell::new(0));
    let counter = attempts.clone();
    let mut orchestrator = Orchestrator::with_backend(Settings::default(), move || {
        *counter.borrow_mut() += 1;
        if *counter.borrow() == 1 {
            Err(Error::ContextCreationFailure("no context".to_owned()))
        } else {
            Ok(Box::new(HeadlessBackend::new()) as Box<dyn Backend>)
        }
    });

    let log = Rc::new(RefCell::new(0));
    let displays = log.clone();
    orchestrator.pipeline_mut().add(scripted(move |_| {
        *displays.borrow_mut() += 1;
        Ok(())
    }));

    assert!(orchestrator.render_frame().is_err());
    assert_eq!(orchestrator.state(), OrchestratorState::Uninitialized);
    assert_eq!(orchestrator.clock().frame_index(), 0);
    assert_eq!(*log.borrow(), 0);

    let info = orchestrator.render_frame().unwrap();
    assert_eq!(info.index, 1);
    assert_eq!(*attempts.borrow(), 2);
    assert_eq!(*log.borrow(), 1);
}

#[test]
fn unbalanced_query() {
    let (mut orchestrator, journal) = setup();

    let mut query = None;
    orchestrator.pipeline_mut().add(scripted(move |ctx| {
        let q = ctx.allocate(ResourceKind::Query)?;
        ctx.begin_query(&q)?;
        ctx.begin_query(&q)?;
        query = Some(q);
        Ok(())
    }));

    let err = orchestrator.render_frame().unwrap_err();
    match err.downcast::<Error>() {
        Ok(Error::DoubleEndOperation(..)) => {}
        v => panic!("unexpected {:?}", v),
    }

    // The sweep ran regardless, reclaiming the query dropped by the failing node.
    assert_eq!(journal.release_calls(ResourceKind::Query), 1);
}

#[test]
fn leaks_surface_in_frame_info() {
    let (mut orchestrator, journal) = setup();

    let handle = orchestrator.allocate(ResourceKind::Renderbuffer).unwrap();
    journal.fail_release(handle.id());
    drop(handle);

    let info = orchestrator.render_frame().unwrap();
    assert_eq!(info.leaks.len(), 1);
    assert!(info.leaks[0].is_leak());
    assert_eq!(info.reclaimed, 0);

    assert!(orchestrator.render_frame().unwrap().leaks.is_empty());
}

#[test]
fn mouse_delta() {
    struct Cursor(Rc<RefCell<Vec<(i32, i32, i32, i32)>>>);

    impl Node for Cursor {
        fn display(&mut self, _: &mut RenderContext) -> Result<()> {
            Ok(())
        }

        fn on_mouse_move(&mut self, dx: i32, x: i32, dy: i32, y: i32) {
            self.0.borrow_mut().push((dx, x, dy, y));
        }
    }

    let (mut orchestrator, _) = setup();
    let moves = Rc::new(RefCell::new(Vec::new()));
    orchestrator.pipeline_mut().add(node(Cursor(moves.clone())));

    let moved = |x, y| InputEvent::MouseMoved {
        position: Vector2::new(x, y),
    };

    assert!(!orchestrator.dispatch(moved(10, 10)));
    orchestrator.dispatch(moved(13, 8));
    orchestrator.dispatch(InputEvent::MouseExited);
    orchestrator.dispatch(moved(20, 20));

    assert_eq!(
        *moves.borrow(),
        vec![(0, 10, 0, 10), (3, 13, -2, 8), (7, 20, 12, 20)]
    );
    assert_eq!(orchestrator.mouse_position(), Some(Vector2::new(20, 20)));
}

#[test]
fn resize_reaches_nodes() {
    struct Canvas(Rc<RefCell<(u32, u32)>>);

    impl Node for Canvas {
        fn display(&mut self, ctx: &mut RenderContext) -> Result<()> {
            assert_eq!(ctx.dimensions(), Vector2::new(320, 200));
            Ok(())
        }

        fn on_resize(&mut self, width: u32, height: u32) {
            *self.0.borrow_mut() = (width, height);
        }
    }

    let (mut orchestrator, _) = setup();
    let size = Rc::new(RefCell::new((0, 0)));
    orchestrator.pipeline_mut().add(node(Canvas(size.clone())));
    assert_eq!(*size.borrow(), (640, 480));

    orchestrator.on_resize(320, 200);
    assert_eq!(*size.borrow(), (320, 200));
    orchestrator.render_frame().unwrap();
}

#[test]
fn draw_statistics() {
    let (mut orchestrator, _) = setup();

    let mut resources = None;
    orchestrator.pipeline_mut().add(scripted(move |ctx| {
        if resources.is_none() {
            let shader = ctx.allocate(ResourceKind::Shader)?;
            let buffer = ctx.allocate(ResourceKind::Buffer)?;
            resources = Some((shader, buffer));
        }

        if let Some((ref shader, ref buffer)) = resources {
            ctx.draw(&DrawCall::new(shader, buffer, Primitive::Triangles, 0, 6))?;
            ctx.draw(&DrawCall::new(shader, buffer, Primitive::Lines, 0, 4))?;
        }

        Ok(())
    }));

    let info = orchestrator.render_frame().unwrap();
    assert_eq!(info.drawcalls, 2);
    assert_eq!(info.alive[ResourceKind::Shader.index()], 1);
    assert_eq!(info.alive[ResourceKind::Buffer.index()], 1);
}

#[test]
fn dispose_is_final() {
    let (mut orchestrator, journal) = setup();
    let handle = orchestrator.allocate(ResourceKind::VertexArray).unwrap();
    let id = handle.id();
    drop(handle);

    let sweep = orchestrator.dispose().unwrap();
    assert_eq!(sweep.reclaimed(ResourceKind::VertexArray), 1);
    assert_eq!(journal.released(ResourceKind::VertexArray), vec![id]);

    assert_eq!(orchestrator.state(), OrchestratorState::Disposed);
    assert!(orchestrator.render_frame().is_err());
    assert_eq!(orchestrator.dispose().unwrap().total(), 0);
}

#[test]
fn query_dropped_while_active() {
    let (mut orchestrator, journal) = setup();

    orchestrator.pipeline_mut().add(scripted(|ctx| {
        let query = ctx.allocate(ResourceKind::Query)?;
        ctx.begin_query(&query)?;
        Ok(())
    }));

    orchestrator.render_frame().unwrap();
    assert_eq!(
        journal.calls(),
        vec![
            Call::Advance,
            Call::Allocate(ResourceKind::Query, 1),
            Call::BeginScope(Scope::Query, 1),
            Call::EndScope(Scope::Query),
            Call::Flush,
            Call::Release(ResourceKind::Query, vec![1]),
        ]
    );

    // The next query can begin since the dropped one has been ended.
    for _ in 0..2 {
        orchestrator.render_frame().unwrap();
    }

    assert_eq!(journal.released(ResourceKind::Query), vec![1, 2, 3]);
}

#[test]
fn query_destroyed_while_active() {
    let (mut orchestrator, journal) = setup();

    orchestrator.pipeline_mut().add(scripted(|ctx| {
        let mut query = ctx.allocate(ResourceKind::Query)?;
        ctx.begin_query(&query)?;
        ctx.destroy(&mut query)?;
        Ok(())
    }));

    orchestrator.render_frame().unwrap();
    orchestrator.render_frame().unwrap();

    let calls = journal.calls();
    let end = calls.iter().position(|v| *v == Call::EndScope(Scope::Query));
    let release = calls
        .iter()
        .position(|v| *v == Call::Release(ResourceKind::Query, vec![1]));

    assert!(end.is_some());
    assert!(end < release);
    assert_eq!(journal.released(ResourceKind::Query), vec![1, 2]);
}

#[test]
fn mouse_delta_saturates() {
    struct Cursor(Rc<RefCell<Vec<(i32, i32)>>>);

    impl Node for Cursor {
        fn display(&mut self, _: &mut RenderContext) -> Result<()> {
            Ok(())
        }

        fn on_mouse_move(&mut self, dx: i32, _: i32, dy: i32, _: i32) {
            self.0.borrow_mut().push((dx, dy));
        }
    }

    let (mut orchestrator, _) = setup();
    let deltas = Rc::new(RefCell::new(Vec::new()));
    orchestrator.pipeline_mut().add(node(Cursor(deltas.clone())));

    let max = i32::max_value();
    let min = i32::min_value();

    orchestrator.dispatch(InputEvent::MouseMoved {
        position: Vector2::new(max, min),
    });
    orchestrator.dispatch(InputEvent::MouseMoved {
        position: Vector2::new(min, max),
    });

    assert_eq!(*deltas.borrow(), vec![(0, 0), (min, max)]);
}

#[test]
fn destroy_ends_active_query() {
    let (mut orchestrator, journal) = setup();

    let query = Rc::new(RefCell::new(orchestrator.allocate(ResourceKind::Query).unwrap()));
    let id = query.borrow().id();

    let shared = query.clone();
    orchestrator.pipeline_mut().add(scripted(move |ctx| {
        let query = shared.borrow();
        if query.is_allocated() {
            ctx.begin_query(&query)?;
        }
        Ok(())
    }));

    // Left recording at the end of the frame, while its owner still holds it.
    orchestrator.render_frame().unwrap();
    assert_eq!(journal.release_calls(ResourceKind::Query), 0);

    orchestrator.destroy(&mut query.borrow_mut()).unwrap();
    assert_eq!(journal.released(ResourceKind::Query), vec![id]);

    let calls = journal.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        &[
            Call::EndScope(Scope::Query),
            Call::Release(ResourceKind::Query, vec![id]),
        ]
    );

    orchestrator.render_frame().unwrap();
}
