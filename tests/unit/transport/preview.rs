use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "ghostink_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn preview(name: &str, keep_history: bool) -> PreviewTransport {
    PreviewTransport::new(
        PanelSize::new(16, 4).unwrap(),
        PreviewOpts {
            out_dir: temp_dir(name),
            keep_history,
        },
    )
}

#[test]
fn writes_before_init_fail() {
    let mut t = preview("preview_asleep", false);
    let p = Plane::new(16, 4);
    assert!(t.display_full(&p, &p).is_err());
}

#[test]
fn full_write_applies_red_wins_and_saves_png() {
    let mut t = preview("preview_full", true);
    t.init().unwrap();

    let mut black = Plane::new(16, 4);
    let mut red = Plane::new(16, 4);
    black.set(1, 1, true);
    black.set(2, 1, true);
    red.set(2, 1, true);
    t.display_full(&black, &red).unwrap();

    assert_eq!(t.cell(1, 1), PixelClass::Black);
    assert_eq!(t.cell(2, 1), PixelClass::Red);
    assert_eq!(t.cell(3, 1), PixelClass::Background);

    let saved = image::open(t.latest_path()).unwrap().to_rgb8();
    assert_eq!(saved.get_pixel(1, 1).0, BLACK);
    assert_eq!(saved.get_pixel(2, 1).0, RED);
    assert!(t.opts.out_dir.join("panel-000001.png").exists());

    std::fs::remove_dir_all(&t.opts.out_dir).ok();
}

#[test]
fn partial_requires_partial_mode_and_keeps_red() {
    let mut t = preview("preview_partial", false);
    t.init().unwrap();

    let mut black = Plane::new(16, 4);
    let mut red = Plane::new(16, 4);
    black.set(10, 0, true);
    red.set(9, 0, true);
    t.display_full(&black, &red).unwrap();

    let region = Region {
        x0: 8,
        y0: 0,
        x1: 16,
        y1: 2,
    };
    let mut slice = Plane::new(8, 2);
    slice.set(3, 1, true);
    assert!(t.display_partial(&slice, region).is_err());

    t.init_partial_mode().unwrap();
    t.display_partial(&slice, region).unwrap();
    assert_eq!(t.cell(9, 0), PixelClass::Red);
    assert_eq!(t.cell(10, 0), PixelClass::Background);
    assert_eq!(t.cell(11, 1), PixelClass::Black);

    t.clear().unwrap();
    assert_eq!(t.cell(9, 0), PixelClass::Background);
    assert_eq!(t.cell(11, 1), PixelClass::Background);
    assert!(t.display_partial(&slice, region).is_err());

    std::fs::remove_dir_all(&t.opts.out_dir).ok();
}
