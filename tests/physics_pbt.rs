use lexivent_core::config::GridConfig;
use lexivent_core::grid::Grid;
use lexivent_core::token::{bond_strength, mutually_exclusive, Token, FRICTION};
use lexivent_core::vent::VENT_TOKENS;
use proptest::prelude::*;

prop_compose! {
    fn arb_vocab_token()(
        idx in 0..VENT_TOKENS.len(),
        x in 0.0f64..100.0,
        y in 0.0f64..100.0,
        z in 0.0f64..100.0,
        energy in -5i32..60,
    ) -> Token {
        Token::new(VENT_TOKENS[idx], x, y, z, energy)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn advance_moves_one_unit_vertically(
        mut token in arb_vocab_token(),
        vx in -2.0f64..2.0,
        vy in -2.0f64..2.0,
        vz in -2.0f64..2.0,
    ) {
        token.vx = vx;
        token.vy = vy;
        token.vz = vz;
        let (z_before, energy_before) = (token.z, token.energy);

        token.advance();

        let dz = token.z - z_before;
        if energy_before > 0 {
            prop_assert!((dz - (1.0 + vz)).abs() < 1e-9, "rising moves +1 plus vz");
            prop_assert_eq!(token.energy, energy_before - 1);
        } else {
            prop_assert!((dz - (-1.0 + vz)).abs() < 1e-9, "sinking moves -1 plus vz");
            prop_assert_eq!(token.energy, energy_before, "sinking is free");
        }
        prop_assert!(token.x.is_finite() && token.y.is_finite() && token.z.is_finite());
        prop_assert!((token.vx - vx * FRICTION).abs() < 1e-9, "friction decays velocity");
    }

    #[test]
    fn energy_never_increases_under_motion(mut token in arb_vocab_token()) {
        for _ in 0..20 {
            let before = token.energy;
            token.advance();
            prop_assert!(token.energy <= before);
        }
    }

    #[test]
    fn bond_strength_stays_in_band(
        a in arb_vocab_token(),
        b in arb_vocab_token(),
    ) {
        if let Some(strength) = bond_strength(&a, &b) {
            prop_assert!((50..=100).contains(&strength),
                "strength {} out of band for {:?} -> {:?}", strength, a.value, b.value);
        }
    }

    #[test]
    fn damaged_tokens_never_bond(
        mut a in arb_vocab_token(),
        b in arb_vocab_token(),
    ) {
        a.damaged = true;
        prop_assert_eq!(bond_strength(&a, &b), None);
        prop_assert_eq!(bond_strength(&b, &a), None);
    }

    #[test]
    fn exclusion_is_symmetric_and_irreflexive(
        a in arb_vocab_token(),
        b in arb_vocab_token(),
    ) {
        prop_assert_eq!(mutually_exclusive(&a, &b), mutually_exclusive(&b, &a));
        prop_assert!(!mutually_exclusive(&a, &a));
    }

    #[test]
    fn cell_keys_floor_coordinates(
        x in 0.0f64..30.0,
        y in 0.0f64..30.0,
        z in 0.0f64..30.0,
    ) {
        let grid = Grid::new(&GridConfig {
            size_x: 30,
            size_y: 30,
            size_z: 30,
            cell_capacity: 100,
        });
        let key = grid.key_for(x, y, z);
        prop_assert_eq!(key, Some((x as usize, y as usize, z as usize)));
    }

    #[test]
    fn mass_tracks_value_length(idx in 0..VENT_TOKENS.len()) {
        let token = Token::new(VENT_TOKENS[idx], 0.0, 0.0, 0.0, 0);
        prop_assert_eq!(token.mass as usize, VENT_TOKENS[idx].len());
    }
}
