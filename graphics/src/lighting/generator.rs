//! Diffuse lighting code.
//!
//! Lighting is computed per vertex by default: the vertex stage exports
//! `ssv_DiffuseFactor` and the fragment stage scales the material color by
//! it. With [`GeneratorFlags::HIGH_QUALITY_LIGHT`] the vertex stage exports
//! view-space normals and positions instead and the factor is computed per
//! fragment.

use opaline_core::geometry::GeometryInterface;

use crate::config::{GeneratorConfig, GeneratorFlags};
use crate::error::ProgramError;
use crate::program::SetType;
use crate::shader::declaration::StageOutput;
use crate::shader::keys::{self, block, variable};
use crate::shader::{
    CodeLocation, ShaderStage, StageGenerator, SyntheticVariable, VariableScope, VariableType,
};

use super::{LightKind, RenderPassType};

const LIGHT_FACTOR: &str = "lightFactor";
const RAY_DIRECTION: &str = "rayDirectionViewSpace";
const DISTANCE: &str = "distanceViewSpace";

fn light_member(member: &str) -> String {
    format!("{}.{member}", block::LIGHT_INSTANCE)
}

/// Adds the lighting of one render pass to the stages of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightGenerator {
    pass: RenderPassType,
    per_fragment: bool,
}

impl LightGenerator {
    pub fn new(pass: RenderPassType, config: &GeneratorConfig) -> Self {
        Self {
            pass,
            per_fragment: config.is_enabled(GeneratorFlags::HIGH_QUALITY_LIGHT),
        }
    }

    pub fn pass(&self) -> RenderPassType {
        self.pass
    }

    pub fn is_per_fragment(&self) -> bool {
        self.per_fragment
    }

    /// Add the lighting code to a stage.
    ///
    /// Fragment code must run after the material wrote
    /// `ssv_OutputFragment`. Simple passes add nothing.
    pub fn generate_shader_code(
        &self,
        generator: &mut StageGenerator,
        geometry: &dyn GeometryInterface,
    ) -> Result<(), ProgramError> {
        match self.pass {
            RenderPassType::Simple => Ok(()),
            RenderPassType::Ambient => self.generate_ambient_code(generator),
            RenderPassType::Light(kind) => {
                if !geometry.flags().has_normals() {
                    let err = ProgramError::Generation(format!(
                        "geometry '{}' has no normals for {}",
                        geometry.identifier(),
                        self.pass
                    ));
                    log::error!("{err}");
                    return Err(err);
                }

                let set = generator.set_indexes().set(SetType::PerLight);
                generator.declare(kind.uniform_block(set, 0))?;

                match (generator.stage(), self.per_fragment) {
                    (ShaderStage::Vertex, false) => self.generate_per_vertex(generator, kind),
                    (ShaderStage::Vertex, true) => {
                        self.request_per_fragment_inputs(generator, kind)
                    }
                    (ShaderStage::Fragment, false) => {
                        apply_diffuse_factor(generator, variable::DIFFUSE_FACTOR);
                        Ok(())
                    }
                    (ShaderStage::Fragment, true) => {
                        let normal = format!("normalize({})", variable::NORMAL_VIEW_SPACE);
                        write_diffuse_factor(
                            generator,
                            CodeLocation::Top,
                            kind,
                            "const float diffuseFactor",
                            &normal,
                        );
                        apply_diffuse_factor(generator, "diffuseFactor");
                        Ok(())
                    }
                    (stage, _) => {
                        let err = ProgramError::Generation(format!(
                            "{} has no code for {stage}",
                            self.pass
                        ));
                        log::error!("{err}");
                        Err(err)
                    }
                }
            }
        }
    }

    fn generate_ambient_code(&self, generator: &mut StageGenerator) -> Result<(), ProgramError> {
        if generator.stage() != ShaderStage::Fragment {
            return Ok(());
        }

        generator.declare_view_uniform_block()?;
        generator.add_code(
            CodeLocation::Output,
            &format!(
                "{}.rgb *= {}.{}.rgb * {}.{};",
                variable::OUTPUT_FRAGMENT,
                block::VIEW_INSTANCE,
                block::AMBIENT_LIGHT_COLOR,
                block::VIEW_INSTANCE,
                block::AMBIENT_LIGHT_INTENSITY
            ),
        );
        Ok(())
    }

    fn request_per_fragment_inputs(
        &self,
        generator: &mut StageGenerator,
        kind: LightKind,
    ) -> Result<(), ProgramError> {
        generator.request(SyntheticVariable::NormalViewSpace, VariableScope::ToNextStage)?;
        if kind.is_positional() {
            generator.request(SyntheticVariable::PositionViewSpace, VariableScope::ToNextStage)?;
        }
        Ok(())
    }

    fn generate_per_vertex(
        &self,
        generator: &mut StageGenerator,
        kind: LightKind,
    ) -> Result<(), ProgramError> {
        generator.request(SyntheticVariable::NormalViewSpace, VariableScope::Local)?;
        if kind.is_positional() {
            generator.request(SyntheticVariable::PositionViewSpace, VariableScope::Local)?;
        }

        let location = keys::shader_variable_location(variable::DIFFUSE_FACTOR)
            .unwrap_or_else(|| generator.next_shader_variable_location(1));
        generator.declare(StageOutput::new(
            location,
            VariableType::Float,
            variable::DIFFUSE_FACTOR,
        ))?;

        write_diffuse_factor(
            generator,
            CodeLocation::Output,
            kind,
            variable::DIFFUSE_FACTOR,
            variable::NORMAL_VIEW_SPACE,
        );
        Ok(())
    }
}

/// Write the statements computing the diffuse factor of a light into
/// `target`.
///
/// The light factor fades positional lights with the distance and spot
/// lights with the cone angle.
fn write_diffuse_factor(
    generator: &mut StageGenerator,
    location: CodeLocation,
    kind: LightKind,
    target: &str,
    normal: &str,
) {
    let mut lines = Vec::new();

    if kind.is_positional() {
        lines.push(format!(
            "const vec3 {DISTANCE} = {}.xyz - {}.xyz;",
            variable::POSITION_VIEW_SPACE,
            light_member(block::POSITION_VIEW_SPACE)
        ));
        lines.push(format!("const vec3 {RAY_DIRECTION} = normalize({DISTANCE});"));
    } else {
        lines.push(format!(
            "const vec3 {RAY_DIRECTION} = normalize({}.xyz);",
            light_member(block::DIRECTION_VIEW_SPACE)
        ));
    }

    lines.push(format!("float {LIGHT_FACTOR} = 1.0;"));

    if kind.is_positional() {
        let radius = light_member(block::RADIUS);
        lines.push(format!("if ( {radius} > 0.0 ) {{"));
        lines.push(format!("\tconst vec3 DR = abs({DISTANCE}) / {radius};"));
        lines.push(format!("\t{LIGHT_FACTOR} *= max(1.0 - dot(DR, DR), 0.0);"));
        lines.push("}".to_string());
    }

    if kind == LightKind::Spot {
        let inner = light_member(block::INNER_COS_ANGLE);
        let outer = light_member(block::OUTER_COS_ANGLE);
        lines.push(format!("if ( {LIGHT_FACTOR} > 0.0 ) {{"));
        lines.push(format!(
            "\tconst float theta = dot({RAY_DIRECTION}, normalize({}.xyz));",
            light_member(block::DIRECTION_VIEW_SPACE)
        ));
        lines.push(format!("\tconst float epsilon = {inner} - {outer};"));
        lines.push(format!(
            "\t{LIGHT_FACTOR} *= clamp((theta - {outer}) / epsilon, 0.0, 1.0);"
        ));
        lines.push("}".to_string());
    }

    lines.push(format!(
        "{target} = max(dot(-{RAY_DIRECTION}, {normal}), 0.0) * {LIGHT_FACTOR};"
    ));

    for line in lines {
        generator.add_code(location, &line);
    }
}

fn apply_diffuse_factor(generator: &mut StageGenerator, factor: &str) {
    generator.add_code(
        CodeLocation::Output,
        &format!(
            "{}.rgb *= {}.rgb * {} * {factor};",
            variable::OUTPUT_FRAGMENT,
            light_member(block::COLOR),
            light_member(block::INTENSITY)
        ),
    );
}
