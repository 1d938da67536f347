//! Prebuilt programs, assembled directly from AST nodes

use crate::ast::{Block, Cond, Expr, Program, Sensor, Stmt};

fn closest_barrel_lr() -> Expr {
    Expr::Sensor(Sensor::BarrelLR(None))
}

fn closest_barrel_fb() -> Expr {
    Expr::Sensor(Sensor::BarrelFB(None))
}

fn zero() -> Expr {
    Expr::Num(0)
}

/// Non-empty block literal
macro_rules! block {
    ($first:expr $(, $rest:expr)* $(,)?) => {
        Block::of($first, Vec::<Stmt>::from([$($rest),*]))
    };
}

/// `turnL; turnR; move;`
pub fn left_right_move() -> Program {
    Program::new(vec![Stmt::TurnL, Stmt::TurnR, Stmt::Move(None)])
}

/// `loop { turnL; turnR; move; }`
pub fn loop_left_right_move() -> Program {
    Program::new(vec![Stmt::Loop(block![
        Stmt::TurnL,
        Stmt::TurnR,
        Stmt::Move(None),
    ])])
}

/// `while (eq(0, 0)) { turnL; turnR; move; }`
pub fn while_left_right_move() -> Program {
    Program::new(vec![Stmt::while_do(
        Cond::eq(zero(), zero()),
        block![Stmt::TurnL, Stmt::TurnR, Stmt::Move(None)],
    )])
}

/// Steer towards the closest barrel and take it, re-reading the barrel
/// sensors at every test
pub fn aim_and_go() -> Program {
    let on_it = Cond::and(
        Cond::eq(closest_barrel_lr(), zero()),
        Cond::eq(closest_barrel_fb(), zero()),
    );
    let ahead = Cond::and(
        Cond::eq(closest_barrel_lr(), zero()),
        Cond::gt(closest_barrel_fb(), zero()),
    );
    let behind = Cond::and(
        Cond::eq(closest_barrel_lr(), zero()),
        Cond::lt(closest_barrel_fb(), zero()),
    );
    let left = Cond::lt(closest_barrel_lr(), zero());
    let right = Cond::gt(closest_barrel_lr(), zero());

    let steer = Stmt::if_then(
        on_it,
        block![Stmt::TakeFuel],
        Some(block![Stmt::if_then(
            ahead,
            block![Stmt::Move(None)],
            Some(block![Stmt::if_then(
                behind,
                block![Stmt::TurnAround],
                Some(block![Stmt::if_then(
                    left,
                    block![Stmt::TurnL],
                    Some(block![Stmt::if_then(right, block![Stmt::TurnR], None)]),
                )]),
            )]),
        )]),
    );
    Program::new(vec![Stmt::Loop(block![steer])])
}

/// Like [`aim_and_go`], but reads each barrel sensor once per iteration into
/// `$lr` and `$fb`
pub fn aim_and_go_loc_var() -> Program {
    let lr = || Expr::var("lr");
    let fb = || Expr::var("fb");

    let steer = Stmt::if_then(
        Cond::and(Cond::eq(lr(), zero()), Cond::eq(fb(), zero())),
        block![Stmt::TakeFuel],
        Some(block![Stmt::if_then(
            Cond::and(Cond::eq(lr(), zero()), Cond::gt(fb(), zero())),
            block![Stmt::Move(None)],
            Some(block![Stmt::if_then(
                Cond::and(Cond::eq(lr(), zero()), Cond::lt(fb(), zero())),
                block![Stmt::TurnAround],
                Some(block![Stmt::if_then(
                    Cond::lt(lr(), zero()),
                    block![Stmt::TurnL],
                    Some(block![Stmt::TurnR]),
                )]),
            )]),
        )]),
    );
    Program::new(vec![Stmt::Loop(block![
        Stmt::assign("lr", closest_barrel_lr()),
        Stmt::assign("fb", closest_barrel_fb()),
        steer,
    ])])
}

/// Hunt barrels while fuel lasts; with no barrel in sight, try to siphon
/// fuel from whatever is ahead
pub fn default_program() -> Program {
    let x = || Expr::var("x");
    let y = || Expr::var("y");

    let seek = block![
        Stmt::assign("x", closest_barrel_lr()),
        Stmt::assign("y", closest_barrel_fb()),
        Stmt::if_then(
            Cond::and(Cond::eq(x(), zero()), Cond::eq(y(), zero())),
            block![Stmt::TakeFuel],
            Some(block![Stmt::if_then(
                Cond::eq(y(), zero()),
                block![Stmt::if_then(
                    Cond::gt(x(), zero()),
                    block![Stmt::TurnL],
                    Some(block![Stmt::TurnR]),
                )],
                Some(block![Stmt::if_then(
                    Cond::gt(y(), zero()),
                    block![Stmt::Move(None)],
                    Some(block![Stmt::TurnAround]),
                )]),
            )]),
        ),
    ];

    Program::new(vec![Stmt::while_do(
        Cond::gt(Expr::Sensor(Sensor::FuelLeft), zero()),
        block![Stmt::if_then(
            Cond::eq(Expr::Sensor(Sensor::NumBarrels), zero()),
            block![Stmt::TakeFuel],
            Some(seek),
        )],
    )])
}

/// Every prebuilt program with its name
pub fn all() -> Vec<(&'static str, Program)> {
    vec![
        ("leftRightMove", left_right_move()),
        ("loopLeftRightMove", loop_left_right_move()),
        ("whileLeftRightMove", while_left_right_move()),
        ("aimAndGo", aim_and_go()),
        ("aimAndGoLocVar", aim_and_go_loc_var()),
        ("default", default_program()),
    ]
}
