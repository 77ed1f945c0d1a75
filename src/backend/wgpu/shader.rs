//! WGSL generation for the tiled smoothing kernel.
//!
//! Workgroup array sizes must be constant expressions in WGSL, so the shader
//! source is specialized per geometry at pipeline-creation time: tile width,
//! kernel width, and the pitched row stride are baked in as constants. The
//! kernel itself is the two-phase protocol: strided cooperative staging of
//! the tile plus halo into workgroup storage, one barrier, then a window
//! reduction per thread. No thread bounds-checks against the grid; the host-side
//! geometry preconditions guarantee every access stays inside the pitched
//! buffer.

use crate::geometry::GridGeometry;

/// Entry point name of the generated kernel.
pub const ENTRY_POINT: &str = "smooth_tile";

/// Generate the WGSL source for `geometry` over buffers with row stride
/// `pitch` (in elements).
pub fn smoothing_shader(geometry: &GridGeometry, pitch: u32) -> String {
    let tile = geometry.tile_width();
    let kernel = geometry.kernel_width();
    let koffset = geometry.kernel_offset();
    let staged_width = geometry.staged_width();
    let staged_slots = geometry.staged_slots();

    format!(
        r#"// Tiled box-kernel smoother (generated per geometry).

const PITCH: u32 = {pitch}u;
const TILE_WIDTH: u32 = {tile}u;
const KERNEL_WIDTH: u32 = {kernel}u;
const KERNEL_OFFSET: u32 = {koffset}u;
const STAGED_WIDTH: u32 = {staged_width}u;

@group(0) @binding(0) var<storage, read> field_in: array<f32>;
@group(0) @binding(1) var<storage, read_write> field_out: array<f32>;

var<workgroup> staged: array<f32, {staged_slots}>;

@compute @workgroup_size({tile}, {tile})
fn {entry}(@builtin(local_invocation_id) lid: vec3<u32>,
           @builtin(workgroup_id) wid: vec3<u32>) {{
    let tx = lid.x;
    let ty = lid.y;
    let gx0 = wid.x * TILE_WIDTH;
    let gy0 = wid.y * TILE_WIDTH;

    // Phase 1: cooperative staging. Each thread strides across the staging
    // buffer in TILE_WIDTH steps, covering its own element plus every halo
    // slot congruent to it modulo the tile width. Every staged slot is
    // written exactly once, even when the halo is wider than the tile.
    var sy = ty;
    while (sy < STAGED_WIDTH) {{
        var sx = tx;
        while (sx < STAGED_WIDTH) {{
            staged[sy * STAGED_WIDTH + sx] = field_in[(gy0 + sy) * PITCH + gx0 + sx];
            sx = sx + TILE_WIDTH;
        }}
        sy = sy + TILE_WIDTH;
    }}

    workgroupBarrier();

    // Phase 2: window reduction, row outer / column inner, single division
    // after the full accumulation.
    var sum: f32 = 0.0;
    for (var j = 0u; j < KERNEL_WIDTH; j = j + 1u) {{
        for (var i = 0u; i < KERNEL_WIDTH; i = i + 1u) {{
            sum = sum + staged[(ty + j) * STAGED_WIDTH + tx + i];
        }}
    }}
    field_out[(gy0 + ty + KERNEL_OFFSET) * PITCH + gx0 + tx + KERNEL_OFFSET] =
        sum / f32(KERNEL_WIDTH * KERNEL_WIDTH);
}}
"#,
        entry = ENTRY_POINT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bakes_geometry_constants() {
        let geom = GridGeometry::new(18, 3, 8).unwrap();
        let source = smoothing_shader(&geom, 64);
        assert!(source.contains("const PITCH: u32 = 64u;"));
        assert!(source.contains("const TILE_WIDTH: u32 = 8u;"));
        assert!(source.contains("const KERNEL_WIDTH: u32 = 3u;"));
        assert!(source.contains("const KERNEL_OFFSET: u32 = 1u;"));
        assert!(source.contains("var<workgroup> staged: array<f32, 100>;"));
        assert!(source.contains("@compute @workgroup_size(8, 8)"));
        assert!(source.contains("fn smooth_tile("));
        assert!(source.contains("workgroupBarrier();"));
    }

    #[test]
    fn staging_strides_past_the_tile() {
        // With tile 2 and kernel 7 the staging buffer is 8 wide, four times
        // the tile width; the staging loops must stride, not stop at one
        // extra element.
        let geom = GridGeometry::new(20, 7, 2).unwrap();
        let source = smoothing_shader(&geom, 64);
        assert!(source.contains("var<workgroup> staged: array<f32, 64>;"));
        assert!(source.contains("while (sy < STAGED_WIDTH)"));
        assert!(source.contains("while (sx < STAGED_WIDTH)"));
        assert!(source.contains("sx = sx + TILE_WIDTH;"));
    }
}
