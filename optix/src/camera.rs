//! Camera math for rendering planar mirrors: a mirror shows the scene as seen
//! from the main viewpoint's reflection, through the mirror's outline.

use super::*;

use nalgebra::{Matrix3, Matrix4, Point3};

/// Below this distance between an eye and a mirror's plane, no frustum is built.
pub const MIN_EYE_DISTANCE: Float = 1e-3;

/// A perspective camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewpoint {
    pub position: Vector<3>,
    pub forward: Direction<3>,
    pub up: Direction<3>,
    /// Vertical field of view, in radians.
    pub fov: Float,
    pub near: Float,
    pub far: Float,
}

impl Viewpoint {
    /// The right-handed world to camera transform.
    #[must_use]
    pub fn view_matrix(&self) -> Matrix4<Float> {
        let eye = Point3::from(self.position);
        Matrix4::look_at_rh(&eye, &(eye + self.forward.into_inner()), self.up.as_ref())
    }

    #[must_use]
    pub fn projection_matrix(&self, aspect: Float) -> Matrix4<Float> {
        Matrix4::new_perspective(aspect, self.fov, self.near, self.far)
    }
}

/// An infinite reflective plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarMirror {
    pub position: Vector<3>,
    pub normal: Direction<3>,
}

impl PlanarMirror {
    #[must_use]
    pub fn reflect_point(&self, p: &Vector<3>) -> Vector<3> {
        let n = self.normal.as_ref();
        p - n * (2.0 * (p - self.position).dot(n))
    }
}

/// Where the main `viewpoint` appears to be, seen through `mirror`.
///
/// Field of view and clip planes are kept as is.
#[must_use]
pub fn reflect_viewpoint(viewpoint: &Viewpoint, mirror: &PlanarMirror) -> Viewpoint {
    Viewpoint {
        position: mirror.reflect_point(&viewpoint.position),
        forward: reflect_unit(&viewpoint.forward, &mirror.normal),
        up: reflect_unit(&viewpoint.up, &mirror.normal),
        ..*viewpoint
    }
}

/// A rectangular mirror, given by three of its corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MirrorQuad {
    pub bottom_left: Vector<3>,
    pub bottom_right: Vector<3>,
    pub top_left: Vector<3>,
}

impl MirrorQuad {
    /// The quad's right, up and normal directions. The normal faces the side
    /// the quad is meant to be seen from.
    ///
    /// Returns `None` if the quad is degenerate.
    #[must_use]
    pub fn basis(&self) -> Option<[Direction<3>; 3]> {
        let right = Unit::try_new(self.bottom_right - self.bottom_left, Float::EPSILON)?;
        let up = Unit::try_new(self.top_left - self.bottom_left, Float::EPSILON)?;
        let normal = Unit::try_new(right.cross(up.as_ref()), Float::EPSILON)?;

        Some([right, up, normal])
    }

    /// The plane this quad lies in.
    #[must_use]
    pub fn plane(&self) -> Option<PlanarMirror> {
        let [_, _, normal] = self.basis()?;
        Some(PlanarMirror {
            position: self.bottom_left,
            normal,
        })
    }
}

/// The extents of a view frustum, as given to `glFrustum`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub left: Float,
    pub right: Float,
    pub bottom: Float,
    pub top: Float,
    pub near: Float,
    pub far: Float,
}

impl Frustum {
    /// The OpenGL style perspective projection of this frustum.
    #[must_use]
    pub fn to_matrix(&self) -> Matrix4<Float> {
        let &Self {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = self;

        #[rustfmt::skip]
        let m = Matrix4::new(
            2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0,
            0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0,
            0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n),
            0.0, 0.0, -1.0, 0.0,
        );

        m
    }
}

/// The asymmetric frustum from `eye` whose sides go through the edges of `quad`,
/// scaled to the `near` plane.
///
/// Returns `None` if `eye` is behind the quad, or closer than [`MIN_EYE_DISTANCE`] to its plane.
#[must_use]
pub fn off_axis_frustum(
    eye: &Vector<3>,
    quad: &MirrorQuad,
    near: Float,
    far: Float,
) -> Option<Frustum> {
    let [vr, vu, vn] = quad.basis()?;

    let to_bottom_left = quad.bottom_left - eye;
    let d = -vn.dot(&to_bottom_left);

    if d < MIN_EYE_DISTANCE {
        log::debug!("eye is {d} in front of the mirror, skipping its frustum");
        return None;
    }

    let scale = near / d;

    Some(Frustum {
        left: vr.dot(&to_bottom_left) * scale,
        right: vr.dot(&(quad.bottom_right - eye)) * scale,
        bottom: vu.dot(&to_bottom_left) * scale,
        top: vu.dot(&(quad.top_left - eye)) * scale,
        near,
        far,
    })
}

/// The full world to clip space transform looking at `quad` from `eye`: the
/// [`off_axis_frustum`], with the camera aligned to the quad's axes.
#[must_use]
pub fn off_axis_projection(
    eye: &Vector<3>,
    quad: &MirrorQuad,
    near: Float,
    far: Float,
) -> Option<Matrix4<Float>> {
    let frustum = off_axis_frustum(eye, quad, near, far)?;
    let [vr, vu, vn] = quad.basis()?;

    let rotation = Matrix3::from_rows(&[vr.transpose(), vu.transpose(), vn.transpose()]);

    Some(
        frustum.to_matrix()
            * rotation.to_homogeneous()
            * Matrix4::new_translation(&-eye),
    )
}
