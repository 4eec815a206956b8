//! Engine-wide GLSL identifiers.
//!
//! Generated stages of a program must agree on these names so that one
//! stage's outputs line up with the next stage's inputs and the application
//! can bind resources by name.

/// GLSL version written when the configuration does not override it.
pub const GLSL_VERSION: &str = "460";
/// GLSL profile written when the configuration does not override it.
pub const GLSL_PROFILE: &str = "core";

/// Extension enabled by every generated stage.
pub const SEPARATE_SHADER_OBJECTS_EXTENSION: &str = "GL_ARB_separate_shader_objects";

/// Vertex attribute names.
pub mod attribute {
    pub const POSITION: &str = "sva_Vertex";
    pub const TANGENT: &str = "sva_Tangent";
    pub const BINORMAL: &str = "sva_Binormal";
    pub const NORMAL: &str = "sva_Normal";
    pub const COLOR: &str = "sva_Color";
    pub const PRIMARY_2D_TEXTURE_COORDINATES: &str = "sva_2DTexCoord0";
    pub const PRIMARY_3D_TEXTURE_COORDINATES: &str = "sva_3DTexCoord0";
    pub const SECONDARY_2D_TEXTURE_COORDINATES: &str = "sva_2DTexCoord1";
    pub const SECONDARY_3D_TEXTURE_COORDINATES: &str = "sva_3DTexCoord1";
    pub const WEIGHTS: &str = "sva_Weights";
    pub const MODEL_MATRIX: &str = "sva_ModelMatrix";
    pub const NORMAL_MODEL_MATRIX: &str = "sva_NormalModelMatrix";
}

/// Block type names, instance names and members.
pub mod block {
    pub const VIEW: &str = "ViewUniformBlock";
    pub const CUBEMAP_VIEW: &str = "CubemapViewUniformBlock";
    pub const MODEL: &str = "ModelUniformBlock";
    pub const LIGHT: &str = "LightUniformBlock";
    pub const MATERIAL: &str = "MaterialUniformBlock";
    pub const MATRICES: &str = "MatricesPushConstantBlock";
    pub const OVERLAY: &str = "OverlayPushConstantBlock";

    pub const VIEW_INSTANCE: &str = "sbb_ViewUniformBlock";
    pub const MODEL_INSTANCE: &str = "sbb_ModelUniformBlock";
    pub const LIGHT_INSTANCE: &str = "sbb_LightUniformBlock";
    pub const MATERIAL_INSTANCE: &str = "sbb_MaterialUniformBlock";
    pub const MATRICES_INSTANCE: &str = "spc_Matrices";
    pub const OVERLAY_INSTANCE: &str = "spc_Overlay";

    /// Structure holding one face of a cubemap view.
    pub const CUBEMAP_FACE: &str = "CubemapFace";
    /// Array member of the cubemap view block.
    pub const INSTANCE: &str = "instance";

    pub const VIEW_MATRIX: &str = "viewMatrix";
    pub const PROJECTION_MATRIX: &str = "projectionMatrix";
    pub const VIEW_PROJECTION_MATRIX: &str = "viewProjectionMatrix";
    pub const POSITION_WORLD_SPACE: &str = "positionWorldSpace";
    pub const VELOCITY: &str = "velocity";
    pub const VIEW_PROPERTIES: &str = "viewProperties";
    pub const AMBIENT_LIGHT_COLOR: &str = "ambientLightColor";
    pub const AMBIENT_LIGHT_INTENSITY: &str = "ambientLightIntensity";
    pub const MODEL_MATRIX: &str = "modelMatrix";
    pub const NORMAL_MODEL_MATRIX: &str = "normalModelMatrix";
    pub const MODEL_VIEW_MATRIX: &str = "modelViewMatrix";
    pub const NORMAL_MATRIX: &str = "normalMatrix";
    pub const MODEL_VIEW_PROJECTION_MATRIX: &str = "modelViewProjectionMatrix";
    pub const COLOR: &str = "color";
    pub const INTENSITY: &str = "intensity";
    pub const DIRECTION_VIEW_SPACE: &str = "directionViewSpace";
    pub const POSITION_VIEW_SPACE: &str = "positionViewSpace";
    pub const RADIUS: &str = "radius";
    pub const INNER_COS_ANGLE: &str = "innerCosAngle";
    pub const OUTER_COS_ANGLE: &str = "outerCosAngle";
    pub const SHININESS: &str = "shininess";
    pub const OPACITY: &str = "opacity";
    pub const AUTO_ILLUMINATION: &str = "autoIllumination";
    pub const TRANSFORMATION_MATRIX: &str = "transformationMatrix";
}

/// Names of sampled textures.
pub mod uniform {
    pub const PRIMARY_TEXTURE: &str = "su_PrimaryTexture";
    pub const SECONDARY_TEXTURE: &str = "su_SecondaryTexture";
    pub const SHADOW_MAP: &str = "su_ShadowMap";
}

/// Names of synthesized and intermediate shader variables.
pub mod variable {
    pub const POSITION_WORLD_SPACE: &str = "ssv_PositionWorldSpace";
    pub const POSITION_VIEW_SPACE: &str = "ssv_PositionViewSpace";
    pub const POSITION_TEXTURE_SPACE: &str = "ssv_PositionTextureSpace";
    pub const COLOR: &str = "ssv_Color";
    pub const PRIMARY_2D_TEXTURE_COORDINATES: &str = "ssv_2DTexCoord0";
    pub const PRIMARY_3D_TEXTURE_COORDINATES: &str = "ssv_3DTexCoord0";
    pub const SECONDARY_2D_TEXTURE_COORDINATES: &str = "ssv_2DTexCoord1";
    pub const SECONDARY_3D_TEXTURE_COORDINATES: &str = "ssv_3DTexCoord1";
    pub const TANGENT_WORLD_SPACE: &str = "ssv_TangentWorldSpace";
    pub const TANGENT_VIEW_SPACE: &str = "ssv_TangentViewSpace";
    pub const BINORMAL_WORLD_SPACE: &str = "ssv_BinormalWorldSpace";
    pub const BINORMAL_VIEW_SPACE: &str = "ssv_BinormalViewSpace";
    pub const NORMAL_WORLD_SPACE: &str = "ssv_NormalWorldSpace";
    pub const NORMAL_VIEW_SPACE: &str = "ssv_NormalViewSpace";
    pub const MODEL_VIEW_MATRIX: &str = "ssv_ModelViewMatrix";
    pub const NORMAL_MATRIX: &str = "ssv_NormalMatrix";
    pub const MODEL_VIEW_PROJECTION_MATRIX: &str = "ssv_ModelViewProjectionMatrix";
    pub const WORLD_TBN_MATRIX: &str = "ssv_WorldTBNMatrix";
    pub const VIEW_TBN_MATRIX: &str = "ssv_ViewTBNMatrix";
    pub const WORLD_TO_TANGENT: &str = "ssv_WorldToTangent";
    pub const OUTPUT_FRAGMENT: &str = "ssv_OutputFragment";
    pub const FRAG_COORD: &str = "ssv_FragCoord";
    pub const LIGHT: &str = "ssv_Light";
    pub const DIFFUSE_FACTOR: &str = "ssv_DiffuseFactor";
    pub const SPECULAR_FACTOR: &str = "ssv_SpecularFactor";

    pub const GL_POSITION: &str = "gl_Position";
    pub const GL_POSITION_WORLD_SPACE: &str = "gl_Position@WorldSpace";
}

/// Shader variables with a fixed interface location, in location order,
/// with the number of locations each one occupies.
///
/// A variable keeps the same location in every stage, so a stage output
/// always meets the matching stage input. Matrices take one location per
/// column.
pub const SHADER_VARIABLE_LOCATIONS: [(&str, u32); 25] = [
    (variable::POSITION_WORLD_SPACE, 1),
    (variable::POSITION_VIEW_SPACE, 1),
    (variable::POSITION_TEXTURE_SPACE, 1),
    (variable::COLOR, 1),
    (variable::PRIMARY_2D_TEXTURE_COORDINATES, 1),
    (variable::PRIMARY_3D_TEXTURE_COORDINATES, 1),
    (variable::SECONDARY_2D_TEXTURE_COORDINATES, 1),
    (variable::SECONDARY_3D_TEXTURE_COORDINATES, 1),
    (variable::TANGENT_WORLD_SPACE, 1),
    (variable::TANGENT_VIEW_SPACE, 1),
    (variable::BINORMAL_WORLD_SPACE, 1),
    (variable::BINORMAL_VIEW_SPACE, 1),
    (variable::NORMAL_WORLD_SPACE, 1),
    (variable::NORMAL_VIEW_SPACE, 1),
    (variable::MODEL_VIEW_MATRIX, 4),
    (variable::NORMAL_MATRIX, 3),
    (variable::MODEL_VIEW_PROJECTION_MATRIX, 4),
    (variable::WORLD_TBN_MATRIX, 3),
    (variable::VIEW_TBN_MATRIX, 3),
    (variable::WORLD_TO_TANGENT, 3),
    (variable::OUTPUT_FRAGMENT, 1),
    (variable::FRAG_COORD, 1),
    (variable::LIGHT, 1),
    (variable::DIFFUSE_FACTOR, 1),
    (variable::SPECULAR_FACTOR, 1),
];

/// Fixed interface location of a shader variable.
pub fn shader_variable_location(name: &str) -> Option<u32> {
    let mut location = 0;
    for (candidate, slots) in SHADER_VARIABLE_LOCATIONS {
        if candidate == name {
            return Some(location);
        }
        location += slots;
    }
    None
}

/// First location past every fixed shader variable.
///
/// Generators allocate their own interface variables from here.
pub fn first_free_location() -> u32 {
    SHADER_VARIABLE_LOCATIONS
        .iter()
        .map(|(_, slots)| slots)
        .sum()
}
