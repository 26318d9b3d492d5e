mod common;

use backdrop_engine::render::raster::{HeadlessHost, RasterCanvas, RasterPoints};
use backdrop_engine::sim::{MAX_DEPTH, displacement};
use backdrop_engine::{
    Backdrop, BackdropError, ManualFrames, Observation, Phase, StarField, StarFieldConfig, WaveGrid,
    WaveGridConfig,
};
use common::{Event, Journal, JournalCanvas, JournalFrames, JournalHost, JournalPoints};

type Stars = Backdrop<StarField<JournalCanvas>, JournalFrames, JournalHost>;
type Dots = Backdrop<WaveGrid<JournalPoints>, JournalFrames, JournalHost>;

fn stars(journal: &Journal, config: StarFieldConfig, w: u32, h: u32) -> Stars {
    let mut b = Backdrop::new(config, JournalFrames::new(journal), JournalHost::new(journal, w, h));
    b.attach().unwrap();
    b
}

fn dots(journal: &Journal, config: WaveGridConfig) -> Dots {
    let host = JournalHost::new(journal, 1280, 720);
    let mut b = Backdrop::new(config, JournalFrames::new(journal), host);
    b.attach().unwrap();
    b
}

fn pump<R, H>(b: &mut Backdrop<R, JournalFrames, H>, frames: u64)
where
    R: backdrop_engine::Renderer,
    H: backdrop_engine::HostSurface,
{
    for _ in 0..frames {
        let next = b.clock().delivered();
        assert!(b.on_frame(next as f64 * 16.0).is_some());
    }
}

#[test]
fn hundred_stars_for_five_hundred_frames() {
    let journal = Journal::default();
    let mut b = stars(&journal, StarFieldConfig { max_stars: 100, ..Default::default() }, 800, 600);

    for i in 0..500 {
        assert!(b.on_frame(i as f64 * 16.0).is_some());
        let field = b.renderer().unwrap();
        for p in field.store().particles() {
            assert!(p.z > 0.0 && p.z <= MAX_DEPTH, "z out of range: {}", p.z);
        }
    }

    let field = b.renderer().unwrap();
    assert!(field.store().resets().total() >= 1);
    assert_eq!(field.frames_drawn(), 500);
    // sideways-recycled particles sit out the frame they were recycled in
    assert_eq!(field.canvas().discs, 100 * 500 - field.store().resets().lateral);
}

#[test]
fn reset_positions_stay_within_spread() {
    let journal = Journal::default();
    let config = StarFieldConfig { max_stars: 200, ..Default::default() };
    let mut b = stars(&journal, config, 1024, 768);
    pump(&mut b, 400);
    let store = b.renderer().unwrap().store();
    let spread = store.spread();
    for p in store.particles() {
        assert!(p.x.abs() <= spread && p.y.abs() <= spread);
    }
}

#[test]
fn teardown_is_idempotent_and_freezes_frame_count() {
    let journal = Journal::default();
    let mut b = stars(&journal, StarFieldConfig { max_stars: 10, ..Default::default() }, 640, 480);
    pump(&mut b, 12);
    assert!(b.is_running());

    b.teardown();
    let after_first = journal.events();
    b.teardown();
    assert_eq!(journal.events(), after_first);

    assert!(b.on_frame(1_000.0).is_none());
    assert_eq!(b.clock().delivered(), 12);
    assert!(!b.is_running());
    assert_eq!(b.phase(), Phase::Detached);
    assert_eq!(journal.count(|e| *e == Event::Detach), 1);
}

#[test]
fn teardown_stops_clock_then_unobserves_then_disposes() {
    let journal = Journal::default();
    let mut b = dots(&journal, WaveGridConfig { amount_x: 4, amount_y: 4, ..Default::default() });
    pump(&mut b, 3);
    b.teardown();

    let cancel = journal.position(|e| matches!(e, Event::Cancel(_))).unwrap();
    let unobserve = journal.position(|e| *e == Event::Unobserve).unwrap();
    let release = journal.position(|e| matches!(e, Event::Release(_))).unwrap();
    let detach = journal.position(|e| *e == Event::Detach).unwrap();
    assert!(cancel < unobserve);
    assert!(unobserve < release);
    assert!(release < detach);
    assert_eq!(journal.count(|e| matches!(e, Event::Release(_))), 2);
}

#[test]
fn drop_tears_down() {
    let journal = Journal::default();
    {
        let config = StarFieldConfig { max_stars: 5, ..Default::default() };
        let mut b = stars(&journal, config, 100, 100);
        pump(&mut b, 2);
    }
    assert_eq!(journal.count(|e| *e == Event::Unobserve), 1);
    assert_eq!(journal.count(|e| *e == Event::Detach), 1);
    assert_eq!(journal.count(|e| matches!(e, Event::Cancel(_))), 1);
}

#[test]
fn attach_acquires_observes_then_requests() {
    let journal = Journal::default();
    let _b = stars(&journal, StarFieldConfig { max_stars: 1, ..Default::default() }, 10, 10);
    assert_eq!(journal.events(), vec![Event::Acquire, Event::Observe, Event::Request(1)]);
}

#[test]
fn zero_area_resize_leaves_state_unchanged() {
    let journal = Journal::default();
    let mut b = stars(&journal, StarFieldConfig { max_stars: 50, ..Default::default() }, 800, 600);
    pump(&mut b, 5);
    let viewport = b.viewport();
    let before = b.renderer().unwrap().store().particles().to_vec();

    assert_eq!(b.resize(0, 600), Observation::Degenerate);
    assert_eq!(b.resize(800, 0), Observation::Degenerate);
    b.host_mut().size = (0, 0);
    assert_eq!(b.sync_size(), Observation::Degenerate);

    assert_eq!(b.viewport(), viewport);
    let field = b.renderer().unwrap();
    assert_eq!(field.store().particles(), &before[..]);
    assert_eq!(field.canvas().size, (800, 600));
}

#[test]
fn resize_reaches_renderer_before_next_frame() {
    let journal = Journal::default();
    let mut b = stars(&journal, StarFieldConfig { max_stars: 20, ..Default::default() }, 800, 600);
    pump(&mut b, 1);
    b.host_mut().size = (1920, 1080);
    assert!(matches!(b.sync_size(), Observation::Changed(_)));
    let field = b.renderer().unwrap();
    assert_eq!(field.canvas().size, (1920, 1080));
    assert_eq!(field.viewport().width, 1920);
}

#[test]
fn paused_star_field_is_frozen() {
    let journal = Journal::default();
    let config = StarFieldConfig { max_stars: 64, paused: true, ..Default::default() };
    let mut b = stars(&journal, config, 800, 600);
    let before = b.renderer().unwrap().store().particles().to_vec();
    pump(&mut b, 50);
    let field = b.renderer().unwrap();
    assert_eq!(field.store().particles(), &before[..]);
    assert_eq!(field.frames_drawn(), 0);
    // the clock keeps re-arming while paused
    assert!(b.clock().is_pending());
    assert_eq!(b.clock().delivered(), 50);
}

#[test]
fn paused_wave_grid_is_frozen() {
    let journal = Journal::default();
    let config = WaveGridConfig { amount_x: 10, amount_y: 10, paused: true, ..Default::default() };
    let mut b = dots(&journal, config);
    let before = b.renderer().unwrap().layer_positions(0).unwrap().clone();
    pump(&mut b, 40);
    let grid = b.renderer().unwrap();
    assert_eq!(grid.layer_positions(0).unwrap(), &before);
    assert_eq!(grid.time(), 0.0);
    assert_eq!(journal.count(|e| *e == Event::Render), 0);
}

#[test]
fn ten_by_ten_grid_matches_closed_form() {
    let journal = Journal::default();
    let mut b = dots(&journal, WaveGridConfig { amount_x: 10, amount_y: 10, ..Default::default() });
    pump(&mut b, 25);

    let grid = b.renderer().unwrap();
    let t = grid.displayed_time().unwrap();
    let positions = grid.layer_positions(0).unwrap();
    for ix in 0..10 {
        for iy in 0..10 {
            let (x, z) = grid.lattice().rest_xz(ix, iy);
            assert_eq!(positions[[ix, iy, 0]], x);
            assert_eq!(positions[[ix, iy, 1]], displacement(ix, iy, t));
            assert_eq!(positions[[ix, iy, 2]], z);
        }
    }
    assert_eq!(grid.backend().uploads, 25 * 2);
}

#[test]
fn acquisition_failure_is_surfaced() {
    let journal = Journal::default();
    let mut host = JournalHost::new(&journal, 800, 600);
    host.fail_acquire = true;
    let mut b: Stars =
        Backdrop::new(StarFieldConfig::default(), JournalFrames::new(&journal), host);

    assert!(matches!(b.attach(), Err(BackdropError::ResourceAcquisition(_))));
    assert_eq!(b.phase(), Phase::Unattached);
    assert!(journal.events().is_empty());
    assert!(b.on_frame(0.0).is_none());
}

#[test]
fn invalid_config_fails_attach_and_releases_surface() {
    let journal = Journal::default();
    let config = WaveGridConfig { amount_x: 0, ..Default::default() };
    let host = JournalHost::new(&journal, 10, 10);
    let mut b: Dots = Backdrop::new(config, JournalFrames::new(&journal), host);
    assert!(matches!(b.attach(), Err(BackdropError::InvalidConfig(_))));
    assert_eq!(b.phase(), Phase::Detached);
    assert_eq!(journal.events(), vec![Event::Acquire, Event::Detach]);
}

#[test]
fn oversized_lattice_is_rejected_before_allocation() {
    let journal = Journal::default();
    let config = WaveGridConfig::from_json(r#"{"amountX": 4611686018427387904, "amountY": 4}"#);
    assert!(matches!(config, Err(BackdropError::InvalidConfig(_))));

    let config =
        WaveGridConfig { amount_x: 4611686018427387904, amount_y: 4, ..Default::default() };
    let mut b: Dots =
        Backdrop::new(config, JournalFrames::new(&journal), JournalHost::new(&journal, 10, 10));
    assert!(matches!(b.attach(), Err(BackdropError::InvalidConfig(_))));
    assert_eq!(b.phase(), Phase::Detached);
    assert_eq!(journal.events(), vec![Event::Acquire, Event::Detach]);
}

#[test]
fn reattach_is_rejected() {
    let journal = Journal::default();
    let mut b = stars(&journal, StarFieldConfig { max_stars: 1, ..Default::default() }, 10, 10);
    assert!(matches!(b.attach(), Err(BackdropError::InvalidTransition(Phase::Attached))));
    b.teardown();
    assert!(matches!(b.attach(), Err(BackdropError::InvalidTransition(Phase::Detached))));
}

#[test]
fn headless_star_field_paints_stars() {
    let config = StarFieldConfig { max_stars: 300, ..Default::default() };
    let mut b: Backdrop<StarField<RasterCanvas>, _, _> =
        Backdrop::new(config, ManualFrames::new(), HeadlessHost::new(320, 180));
    b.attach().unwrap();
    assert!(b.host().is_observing());
    for i in 0..5 {
        b.on_frame(i as f64 * 16.0);
    }

    let image = b.renderer().unwrap().canvas().image();
    assert_eq!(image.dimensions(), (320, 180));
    assert!(image.pixels().all(|p| p.0[3] == 255));
    assert!(image.pixels().any(|p| p.0[0] > 60 && p.0[1] > 60));

    b.host_mut().set_size(200, 100);
    b.sync_size();
    b.on_frame(100.0);
    assert_eq!(b.renderer().unwrap().canvas().image().dimensions(), (200, 100));

    b.teardown();
    assert!(!b.host().is_observing());
}

#[test]
fn headless_wave_grid_draws_both_layers() {
    let mut b: Backdrop<WaveGrid<RasterPoints>, _, _> =
        Backdrop::new(WaveGridConfig::default(), ManualFrames::new(), HeadlessHost::new(320, 180));
    b.attach().unwrap();
    b.on_frame(0.0);
    let points = b.renderer().unwrap().backend();
    assert_eq!(points.live_layers(), 2);
    assert!(points.image().pixels().any(|p| p.0[3] > 0));
    assert_eq!(b.frames_mut().requested(), 2);
}

#[test]
fn options_parse_from_json() {
    let json = r#"{"hue": 300, "maxStars": 12, "resizePolicy": "rescale"}"#;
    let stars = StarFieldConfig::from_json(json).unwrap();
    assert_eq!(stars.hue, 300.0);
    assert_eq!(stars.max_stars, 12);
    assert_eq!(stars.twinkle_intensity, 18.0);

    let json = r##"{"pointColor": "#ff0000", "parallax": false}"##;
    let dots = WaveGridConfig::from_json(json).unwrap();
    assert!(!dots.parallax);
    assert_eq!(dots.amount_x, 40);

    let typo = StarFieldConfig::from_json(r#"{"maxStarz": 1}"#);
    assert!(matches!(typo, Err(BackdropError::Options(_))));
}
