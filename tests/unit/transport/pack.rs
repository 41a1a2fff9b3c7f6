use rand::{Rng, SeedableRng, rngs::StdRng};

use super::*;

#[test]
fn red_wins_on_conflict() {
    let mut black = Plane::new(8, 1);
    let mut red = Plane::new(8, 1);
    black.set(0, 0, true);
    black.set(1, 0, true);
    red.set(1, 0, true);

    let buf = PanelBuffer::pack(&black, &red).unwrap();
    assert_eq!(buf.black, vec![0b1000_0000]);
    assert_eq!(buf.red, vec![0b0100_0000]);
    assert!(!buf.has_conflicts());
}

#[test]
fn random_planes_never_pack_both_bits() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let (w, h) = (rng.gen_range(1..40u32), rng.gen_range(1..20u32));
        let mut black = Plane::new(w, h);
        let mut red = Plane::new(w, h);
        for y in 0..h {
            for x in 0..w {
                black.set(x, y, rng.gen_bool(0.5));
                red.set(x, y, rng.gen_bool(0.5));
            }
        }

        let buf = PanelBuffer::pack(&black, &red).unwrap();
        assert!(!buf.has_conflicts());
        assert_eq!(buf.black.len(), buf.stride() * h as usize);

        // Every inked cell stays inked in exactly one color.
        let packed_black = Plane::from_packed(w, h, buf.black.clone()).unwrap();
        let packed_red = Plane::from_packed(w, h, buf.red.clone()).unwrap();
        for y in 0..h {
            for x in 0..w {
                let had_ink = black.get(x, y) || red.get(x, y);
                assert_eq!(had_ink, packed_black.get(x, y) || packed_red.get(x, y));
                assert_eq!(packed_red.get(x, y), red.get(x, y));
            }
        }
    }
}

#[test]
fn pack_rejects_size_mismatch() {
    assert!(PanelBuffer::pack(&Plane::new(8, 2), &Plane::new(8, 3)).is_err());
}
