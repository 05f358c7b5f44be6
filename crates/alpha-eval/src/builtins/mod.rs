pub mod cs;
pub mod scalar_math;
pub mod ts;

pub fn load_builtins() {
    ts::register_builtins();
    cs::register_builtins();
    scalar_math::register_builtins();
}
