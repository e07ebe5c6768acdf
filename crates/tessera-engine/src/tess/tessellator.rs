//! Emulated triangle-domain tessellator.
//!
//! wgpu has no fixed-function tessellator, so the tessellation vertex stage derives
//! its domain points from the factor record itself. This module holds:
//! - the CPU reference (used by tests and for sizing the draw call),
//! - the matching WGSL library, generated for a fixed configuration.
//!
//! The inside factor sets `n` segments for a triangular grid of points `(i, j, k)`
//! with `i + j + k = n`, located at `(t(i), t(j), t(k))` normalised by its sum,
//! where `t` is the 1D edge partition. Each outer edge is split by its own edge
//! factor and stitched to the first inner ring of that grid:
//! - `m = n - 3` inner segments; the inner grid is the points with `i, j, k >= 1`
//! - `m * m` inner triangles, row by row (`i = 0..m`), each row alternating
//!   "up" `(i,j) (i+1,j) (i,j+1)` and "down" `(i+1,j) (i+1,j+1) (i,j+1)` triangles
//! - then one strip per edge with `s + m` triangles, `s` being that edge's segment count
//!
//! Edge `e` lies opposite corner `e` and runs from corner `e + 1` to `e + 2`.
//! Below 3 inside segments the inner ring shrinks to the centroid, unless every
//! edge matches the inside count, in which case the plain `n * n` grid is used.
//! Uniform factors therefore always give `n * n` triangles.
//!
//! Fractional partitions place two shorter segments symmetrically around the
//! middle of each edge, so positions vary continuously with the factor and match
//! integer partitioning exactly when the factor is a whole segment count.

use super::config::{PartitionMode, TessellationConfig, Winding};

/// Fixed tessellator configuration, shared by the CPU reference and the WGSL library.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tessellator {
    partition: PartitionMode,
    winding: Winding,
    max_factor: f32,
}

impl Tessellator {
    pub fn new(partition: PartitionMode, winding: Winding, max_factor: u16) -> Self {
        let min = partition.min_factor() as f32;
        Self { partition, winding, max_factor: (max_factor as f32).max(min) }
    }

    pub fn from_config(config: &TessellationConfig) -> Self {
        Self::new(config.partition_mode, config.output_winding, config.max_tessellation_factor)
    }

    #[inline]
    pub fn partition(&self) -> PartitionMode {
        self.partition
    }

    #[inline]
    pub fn winding(&self) -> Winding {
        self.winding
    }

    /// Clamps a raw factor to `[min_factor(partition), max]`. NaN maps to the minimum.
    pub fn clamp_factor(&self, f: f32) -> f32 {
        let min = self.partition.min_factor() as f32;
        if f.is_nan() {
            return min;
        }
        f.clamp(min, self.max_factor)
    }

    /// Clamps the factor record and resolves segment counts for one patch.
    pub fn patch_layout(&self, edges: [f32; 3], inside: f32) -> PatchLayout {
        let edge_factors = edges.map(|f| self.clamp_factor(f));
        let inside_factor = self.clamp_factor(inside);
        PatchLayout {
            edge_factors,
            edge_segments: edge_factors.map(|f| self.segment_count(f)),
            inside_factor,
            inside_segments: self.segment_count(inside_factor),
        }
    }

    /// Segments per edge for a clamped factor.
    pub fn segment_count(&self, f: f32) -> u32 {
        let c = (f.ceil() as u32).max(1);
        match self.partition {
            PartitionMode::Integer => c,
            PartitionMode::Pow2 => c.next_power_of_two(),
            PartitionMode::FractionalOdd => c | 1,
            PartitionMode::FractionalEven => (c + 1) & !1,
        }
    }

    /// Segments per edge at the configured max factor; bounds every patch.
    pub fn max_segment_count(&self) -> u32 {
        self.segment_count(self.max_factor)
    }

    /// Upper bound of [`PatchLayout::triangle_count`] under this configuration.
    pub fn max_triangle_count(&self) -> u32 {
        let n = self.max_segment_count();
        (n * n).max(3 * n)
    }

    /// Vertices requested per patch instance (enough for the densest patch).
    pub fn vertices_per_patch(&self) -> u32 {
        self.max_triangle_count() * 3
    }

    fn is_fractional(&self) -> bool {
        matches!(self.partition, PartitionMode::FractionalOdd | PartitionMode::FractionalEven)
    }

    /// Position of grid line `i` (`0..=n`) along an edge, in `[0, 1]`.
    pub fn edge_position(&self, f: f32, n: u32, i: u32) -> f32 {
        if !self.is_fractional() || n < 2 {
            return i as f32 / n.max(1) as f32;
        }

        // Indices of the two short segments.
        let (a, b) = if n % 2 == 0 { (n / 2 - 1, n / 2) } else { ((n - 1) / 2 - 1, (n - 1) / 2 + 1) };
        let shorts_before = (i > a) as u32 + (i > b) as u32;

        let full = 1.0 / f;
        let short = (f - n as f32 + 2.0) / (2.0 * f);
        (i - shorts_before) as f32 * full + shorts_before as f32 * short
    }

    /// Barycentric domain location of grid point `(i, j, n - i - j)`.
    pub fn domain_point(&self, f: f32, n: u32, i: u32, j: u32) -> [f32; 3] {
        let k = n.saturating_sub(i + j);
        let u = self.edge_position(f, n, i);
        let v = self.edge_position(f, n, j);
        let w = self.edge_position(f, n, k);
        let sum = u + v + w;
        if sum <= f32::EPSILON {
            return [1.0 / 3.0; 3];
        }
        [u / sum, v / sum, w / sum]
    }

    /// Grid coordinates `(i, j)` of the corners of triangle `t` (`0..n*n`), in emission order.
    pub fn triangle_corners(&self, n: u32, t: u32) -> [[u32; 2]; 3] {
        let n = n.max(1);
        let mut t = t.min(n * n - 1);

        let mut i = 0u32;
        while i < n {
            let row_tris = 2 * (n - i) - 1;
            if t < row_tris {
                break;
            }
            t -= row_tris;
            i += 1;
        }

        let j = t / 2;
        let corners = if t & 1 == 0 {
            [[i, j], [i + 1, j], [i, j + 1]]
        } else {
            [[i + 1, j], [i + 1, j + 1], [i, j + 1]]
        };

        match self.winding {
            Winding::Clockwise => corners,
            Winding::CounterClockwise => [corners[0], corners[2], corners[1]],
        }
    }

    /// Point `a` (`0..=s`) of the split outer edge `e`.
    pub fn outer_point(&self, layout: &PatchLayout, e: usize, a: u32) -> [f32; 3] {
        let t = self.edge_position(layout.edge_factors[e], layout.edge_segments[e], a);
        let mut p = [0.0; 3];
        p[(e + 1) % 3] = 1.0 - t;
        p[(e + 2) % 3] = t;
        p
    }

    /// Point `b` (`0..=m`) of the inner-ring side facing edge `e`.
    pub fn inner_point(&self, layout: &PatchLayout, e: usize, b: u32) -> [f32; 3] {
        let n = layout.inside_segments;
        if n < 3 {
            return [1.0 / 3.0; 3];
        }
        let mut grid = [1u32; 3];
        grid[(e + 1) % 3] = n - 2 - b;
        grid[(e + 2) % 3] = 1 + b;
        self.domain_point(layout.inside_factor, n, grid[0], grid[1])
    }

    /// Barycentric corners of triangle `t` (`0..layout.triangle_count()`), in emission order.
    pub fn triangle(&self, layout: &PatchLayout, t: u32) -> [[f32; 3]; 3] {
        let n = layout.inside_segments;
        let (f, m) = (layout.inside_factor, layout.inner_segments());

        if layout.is_plain_grid() {
            return self.triangle_corners(n, t).map(|[i, j]| self.domain_point(f, n, i, j));
        }
        if t < m * m {
            return self.triangle_corners(m, t).map(|[i, j]| self.domain_point(f, n, i + 1, j + 1));
        }

        let mut t = t - m * m;
        let mut e = 0;
        while e < 2 && t >= layout.edge_segments[e] + m {
            t -= layout.edge_segments[e] + m;
            e += 1;
        }

        let s = layout.edge_segments[e];
        let (a, b, outer) = stitch_step(s, m, t);
        let second = if outer { self.outer_point(layout, e, a + 1) } else { self.inner_point(layout, e, b + 1) };
        let corners = [self.outer_point(layout, e, a), second, self.inner_point(layout, e, b)];

        match self.winding {
            Winding::Clockwise => corners,
            Winding::CounterClockwise => [corners[0], corners[2], corners[1]],
        }
    }

    /// CPU reference of one patch: barycentric corners of every emitted triangle.
    pub fn tessellate(&self, edges: [f32; 3], inside: f32) -> Vec<[[f32; 3]; 3]> {
        let layout = self.patch_layout(edges, inside);
        (0..layout.triangle_count()).map(|t| self.triangle(&layout, t)).collect()
    }

    /// WGSL implementation of this tessellator.
    ///
    /// Pure math, no bindings; prepended to the tessellation stage source.
    pub fn wgsl_library(&self) -> String {
        let min_factor = self.partition.min_factor() as f32;
        let max_factor = self.max_factor;
        let partition = self.partition.shader_id();
        let ccw = matches!(self.winding, Winding::CounterClockwise);
        format!(
            r#"
// ---- triangle-domain tessellator (generated) ----
const TESS_PARTITION: u32 = {partition}u;
const TESS_MIN_FACTOR: f32 = {min_factor:?};
const TESS_MAX_FACTOR: f32 = {max_factor:?};
const TESS_WINDING_CCW: bool = {ccw};

fn tess_clamp_factor(f: f32) -> f32 {{
  return clamp(f, TESS_MIN_FACTOR, TESS_MAX_FACTOR);
}}

fn tess_segment_count(f: f32) -> u32 {{
  let c = max(u32(ceil(f)), 1u);
  if (c == 1u) {{
    return 1u;
  }}
  switch TESS_PARTITION {{
    case 1u: {{
      return 1u << (32u - countLeadingZeros(c - 1u));
    }}
    case 2u: {{
      return c | 1u;
    }}
    case 3u: {{
      return (c + 1u) & ~1u;
    }}
    default: {{
      return c;
    }}
  }}
}}

fn tess_edge_position(f: f32, n: u32, i: u32) -> f32 {{
  if (TESS_PARTITION < 2u || n < 2u) {{
    return f32(i) / f32(max(n, 1u));
  }}
  var a = n / 2u - 1u;
  var b = n / 2u;
  if ((n & 1u) == 1u) {{
    a = (n - 1u) / 2u - 1u;
    b = (n - 1u) / 2u + 1u;
  }}
  let shorts_before = select(0u, 1u, i > a) + select(0u, 1u, i > b);
  let full = 1.0 / f;
  let short_len = (f - f32(n) + 2.0) / (2.0 * f);
  return f32(i - shorts_before) * full + f32(shorts_before) * short_len;
}}

fn tess_domain_point(f: f32, n: u32, i: u32, j: u32) -> vec3<f32> {{
  let k = n - min(i + j, n);
  let p = vec3<f32>(tess_edge_position(f, n, i), tess_edge_position(f, n, j), tess_edge_position(f, n, k));
  let sum = p.x + p.y + p.z;
  if (sum <= 1e-7) {{
    return vec3<f32>(1.0 / 3.0);
  }}
  return p / sum;
}}

// Grid coordinates of corner `corner` (0..3) of triangle `t`.
fn tess_triangle_corner(n: u32, t_in: u32, corner_in: u32) -> vec2<u32> {{
  let l = max(n, 1u);
  var t = min(t_in, l * l - 1u);
  var i: u32 = 0u;
  loop {{
    if (i >= l) {{
      break;
    }}
    let row_tris = 2u * (l - i) - 1u;
    if (t < row_tris) {{
      break;
    }}
    t = t - row_tris;
    i = i + 1u;
  }}

  let j = t / 2u;
  var corner = corner_in;
  if (TESS_WINDING_CCW && corner != 0u) {{
    corner = 3u - corner;
  }}

  if ((t & 1u) == 0u) {{
    switch corner {{
      case 0u: {{ return vec2<u32>(i, j); }}
      case 1u: {{ return vec2<u32>(i + 1u, j); }}
      default: {{ return vec2<u32>(i, j + 1u); }}
    }}
  }}
  switch corner {{
    case 0u: {{ return vec2<u32>(i + 1u, j); }}
    case 1u: {{ return vec2<u32>(i + 1u, j + 1u); }}
    default: {{ return vec2<u32>(i, j + 1u); }}
  }}
}}

struct TessPatch {{
  edge_factors: vec3<f32>,
  edge_segments: vec3<u32>,
  inside_factor: f32,
  inside_segments: u32,
}};

fn tess_patch(edges: vec3<f32>, inside: f32) -> TessPatch {{
  var p: TessPatch;
  p.edge_factors = vec3<f32>(tess_clamp_factor(edges.x), tess_clamp_factor(edges.y), tess_clamp_factor(edges.z));
  p.edge_segments = vec3<u32>(
    tess_segment_count(p.edge_factors.x),
    tess_segment_count(p.edge_factors.y),
    tess_segment_count(p.edge_factors.z),
  );
  p.inside_factor = tess_clamp_factor(inside);
  p.inside_segments = tess_segment_count(p.inside_factor);
  return p;
}}

fn tess_is_plain_grid(p: TessPatch) -> bool {{
  return p.inside_segments < 3u && all(p.edge_segments == vec3<u32>(p.inside_segments));
}}

fn tess_inner_segments(p: TessPatch) -> u32 {{
  return select(0u, p.inside_segments - 3u, p.inside_segments >= 3u);
}}

fn tess_triangle_count(p: TessPatch) -> u32 {{
  if (tess_is_plain_grid(p)) {{
    return p.inside_segments * p.inside_segments;
  }}
  let m = tess_inner_segments(p);
  return m * m + 3u * m + p.edge_segments.x + p.edge_segments.y + p.edge_segments.z;
}}

fn tess_axis(i: u32) -> vec3<u32> {{
  return vec3<u32>(select(0u, 1u, i == 0u), select(0u, 1u, i == 1u), select(0u, 1u, i == 2u));
}}

fn tess_outer_point(p: TessPatch, e: u32, a: u32) -> vec3<f32> {{
  let t = tess_edge_position(p.edge_factors[e], p.edge_segments[e], a);
  return (1.0 - t) * vec3<f32>(tess_axis((e + 1u) % 3u)) + t * vec3<f32>(tess_axis((e + 2u) % 3u));
}}

fn tess_inner_point(p: TessPatch, e: u32, b: u32) -> vec3<f32> {{
  let n = p.inside_segments;
  if (n < 3u) {{
    return vec3<f32>(1.0 / 3.0);
  }}
  let grid = (n - 2u - b) * tess_axis((e + 1u) % 3u) + (1u + b) * tess_axis((e + 2u) % 3u) + tess_axis(e);
  return tess_domain_point(p.inside_factor, n, grid.x, grid.y);
}}

fn tess_stitch_advances_outer(a: u32, b: u32, s: u32, m: u32) -> bool {{
  if (a >= s) {{
    return false;
  }}
  if (b >= m) {{
    return true;
  }}
  return (2u * a + 1u) * m <= (2u * b + 1u) * s;
}}

// Barycentric location of corner `corner` (0..3) of triangle `t`.
fn tess_corner(p: TessPatch, t_in: u32, corner_in: u32) -> vec3<f32> {{
  let n = p.inside_segments;
  if (tess_is_plain_grid(p)) {{
    let g = tess_triangle_corner(n, t_in, corner_in);
    return tess_domain_point(p.inside_factor, n, g.x, g.y);
  }}
  let m = tess_inner_segments(p);
  if (t_in < m * m) {{
    let g = tess_triangle_corner(m, t_in, corner_in);
    return tess_domain_point(p.inside_factor, n, g.x + 1u, g.y + 1u);
  }}

  var t = t_in - m * m;
  var e: u32 = 0u;
  loop {{
    if (e >= 2u || t < p.edge_segments[e] + m) {{
      break;
    }}
    t = t - (p.edge_segments[e] + m);
    e = e + 1u;
  }}

  let s = p.edge_segments[e];
  var a: u32 = 0u;
  var b: u32 = 0u;
  for (var walked: u32 = 0u; walked < t; walked = walked + 1u) {{
    if (tess_stitch_advances_outer(a, b, s, m)) {{
      a = a + 1u;
    }} else {{
      b = b + 1u;
    }}
  }}

  var corner = corner_in;
  if (TESS_WINDING_CCW && corner != 0u) {{
    corner = 3u - corner;
  }}
  switch corner {{
    case 0u: {{
      return tess_outer_point(p, e, a);
    }}
    case 1u: {{
      if (tess_stitch_advances_outer(a, b, s, m)) {{
        return tess_outer_point(p, e, a + 1u);
      }}
      return tess_inner_point(p, e, b + 1u);
    }}
    default: {{
      return tess_inner_point(p, e, b);
    }}
  }}
}}
"#
        )
    }
}

/// Clamped factors and segment counts of one patch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PatchLayout {
    pub edge_factors: [f32; 3],
    pub edge_segments: [u32; 3],
    pub inside_factor: f32,
    pub inside_segments: u32,
}

impl PatchLayout {
    /// Small uniform patches skip the ring and use the full grid.
    pub fn is_plain_grid(&self) -> bool {
        let n = self.inside_segments;
        n < 3 && self.edge_segments.iter().all(|&s| s == n)
    }

    /// Segments per side of the inner grid; 0 when it is a single point.
    pub fn inner_segments(&self) -> u32 {
        self.inside_segments.saturating_sub(3)
    }

    pub fn triangle_count(&self) -> u32 {
        if self.is_plain_grid() {
            return self.inside_segments * self.inside_segments;
        }
        let m = self.inner_segments();
        m * m + 3 * m + self.edge_segments.iter().sum::<u32>()
    }
}

/// Whether the stitch at outer point `a`, inner point `b` advances along the
/// outer edge (`s` segments) rather than the inner side (`m` segments).
///
/// Picks the side whose next segment midpoint comes first.
fn stitch_advances_outer(a: u32, b: u32, s: u32, m: u32) -> bool {
    if a >= s {
        return false;
    }
    if b >= m {
        return true;
    }
    (2 * a + 1) * m <= (2 * b + 1) * s
}

/// Outer and inner positions before strip triangle `t`, and which side it advances.
fn stitch_step(s: u32, m: u32, t: u32) -> (u32, u32, bool) {
    let (mut a, mut b) = (0, 0);
    for _ in 0..t {
        if stitch_advances_outer(a, b, s, m) {
            a += 1;
        } else {
            b += 1;
        }
    }
    (a, b, stitch_advances_outer(a, b, s, m))
}
