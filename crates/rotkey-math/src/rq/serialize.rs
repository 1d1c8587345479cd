//! Implementation of serialization and deserialization.

use super::{traits::TryConvertFrom, Context, Poly, Representation};
use crate::{
    proto::rq::{Representation as RepresentationProto, Rq},
    Error, Result,
};
use ndarray::Array2;
use prost::Message;
use rotkey_traits::{DeserializeWithContext, Serialize};
use std::sync::Arc;

impl From<&Poly> for Rq {
    fn from(p: &Poly) -> Self {
        let mut proto = Rq::default();
        match p.representation {
            Representation::PowerBasis => {
                proto.set_representation(RepresentationProto::Powerbasis);
            }
            Representation::Ntt => {
                proto.set_representation(RepresentationProto::Ntt);
            }
        }
        proto.degree = p.ctx.degree as u32;
        proto.coefficients = p
            .coefficients
            .iter()
            .flat_map(|c| c.to_le_bytes())
            .collect();
        proto
    }
}

impl TryConvertFrom<&Rq> for Poly {
    fn try_convert_from(
        value: &Rq,
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        let representation_from_proto = match RepresentationProto::try_from(value.representation)
        {
            Ok(RepresentationProto::Powerbasis) => Representation::PowerBasis,
            Ok(RepresentationProto::Ntt) => Representation::Ntt,
            _ => return Err(Error::Serialization("Unknown representation".to_string())),
        };
        if representation_from_proto != representation {
            return Err(Error::Serialization(
                "The representation asked for does not match the representation in the serialization"
                    .to_string(),
            ));
        }

        if value.degree as usize != ctx.degree {
            return Err(Error::Serialization("Invalid degree".to_string()));
        }

        let expected_len = 8 * ctx.degree * ctx.q.len();
        if value.coefficients.len() != expected_len {
            return Err(Error::Serialization(format!(
                "Invalid number of coefficient bytes: got {}, expected {}",
                value.coefficients.len(),
                expected_len
            )));
        }

        let coefficients = value
            .coefficients
            .chunks_exact(8)
            .map(|chunk| {
                chunk
                    .try_into()
                    .map(u64::from_le_bytes)
                    .map_err(|_| Error::Serialization("Invalid coefficient".to_string()))
            })
            .collect::<Result<Vec<u64>>>()?;
        let coefficients = Array2::from_shape_vec((ctx.q.len(), ctx.degree), coefficients)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        Poly::try_convert_from(coefficients, ctx, representation)
            .map_err(|_| Error::Serialization("Coefficients are out of range".to_string()))
    }
}

impl Serialize for Poly {
    fn to_bytes(&self) -> Vec<u8> {
        Rq::from(self).encode_to_vec()
    }
}

impl DeserializeWithContext for Poly {
    type Error = Error;
    type Context = Context;

    fn from_bytes(bytes: &[u8], ctx: &Arc<Context>) -> Result<Self> {
        let rq = Rq::decode(bytes).map_err(|e| Error::Serialization(e.to_string()))?;
        let representation = match RepresentationProto::try_from(rq.representation) {
            Ok(RepresentationProto::Ntt) => Representation::Ntt,
            _ => Representation::PowerBasis,
        };
        Poly::try_convert_from(&rq, ctx, representation)
    }
}
